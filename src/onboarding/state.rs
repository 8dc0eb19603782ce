//! Onboarding steps and their metadata.

use serde::{Deserialize, Serialize};

/// The steps of the profile-setup wizard.
///
/// Order and metadata live in [`STEPS`]; nothing else encodes the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Name,
    Goal,
    Restrictions,
    Favorites,
    Avoid,
}

/// Static description of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMetadata {
    pub step: OnboardingStep,
    /// A required step cannot be skipped, and cannot be left forward
    /// without passing its validation rule.
    pub required: bool,
    pub label: &'static str,
    pub icon: &'static str,
}

/// The wizard, in order.
pub static STEPS: &[StepMetadata] = &[
    StepMetadata {
        step: OnboardingStep::Name,
        required: true,
        label: "What should we call you?",
        icon: "👋",
    },
    StepMetadata {
        step: OnboardingStep::Goal,
        required: false,
        label: "What's your main goal?",
        icon: "🎯",
    },
    StepMetadata {
        step: OnboardingStep::Restrictions,
        required: false,
        label: "Any dietary restrictions?",
        icon: "🥗",
    },
    StepMetadata {
        step: OnboardingStep::Favorites,
        required: false,
        label: "What are your favorite ingredients?",
        icon: "❤️",
    },
    StepMetadata {
        step: OnboardingStep::Avoid,
        required: false,
        label: "Any ingredients to avoid?",
        icon: "🚫",
    },
];

impl OnboardingStep {
    /// Position in [`STEPS`].
    pub fn index(&self) -> usize {
        STEPS
            .iter()
            .position(|m| m.step == *self)
            .unwrap_or_default()
    }

    /// Step at `index`, if in range.
    pub fn at(index: usize) -> Option<OnboardingStep> {
        STEPS.get(index).map(|m| m.step)
    }

    pub fn first() -> OnboardingStep {
        STEPS[0].step
    }

    pub fn last() -> OnboardingStep {
        STEPS[STEPS.len() - 1].step
    }

    pub fn metadata(&self) -> &'static StepMetadata {
        &STEPS[self.index()]
    }

    pub fn is_required(&self) -> bool {
        self.metadata().required
    }

    pub fn is_last(&self) -> bool {
        self.index() == STEPS.len() - 1
    }

    pub fn next(&self) -> Option<OnboardingStep> {
        Self::at(self.index() + 1)
    }

    pub fn previous(&self) -> Option<OnboardingStep> {
        self.index().checked_sub(1).and_then(Self::at)
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::first()
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Goal => "goal",
            Self::Restrictions => "restrictions",
            Self::Favorites => "favorites",
            Self::Avoid => "avoid",
        };
        write!(f, "{s}")
    }
}
