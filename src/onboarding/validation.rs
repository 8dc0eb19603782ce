//! Per-step validation rules. Pure: no mutation, no I/O.

use super::model::ProfileDraft;
use super::state::OnboardingStep;
use crate::error::OnboardingError;

pub const NAME_REQUIRED: &str = "Please enter your name";

/// Check whether `draft` may leave `step` going forward.
pub fn validate(step: OnboardingStep, draft: &ProfileDraft) -> Result<(), OnboardingError> {
    let failure = match step {
        OnboardingStep::Name if draft.display_name.trim().is_empty() => Some(NAME_REQUIRED),
        OnboardingStep::Name
        | OnboardingStep::Goal
        | OnboardingStep::Restrictions
        | OnboardingStep::Favorites
        | OnboardingStep::Avoid => None,
    };

    match failure {
        Some(message) => Err(OnboardingError::ValidationFailed {
            step,
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::state::STEPS;

    #[test]
    fn blank_name_fails() {
        let mut draft = ProfileDraft::new();
        for name in ["", "   ", "\t\n"] {
            draft.set_display_name(name);
            let err = validate(OnboardingStep::Name, &draft).unwrap_err();
            assert_eq!(err.to_string(), NAME_REQUIRED);
            assert!(matches!(err, OnboardingError::ValidationFailed { step: OnboardingStep::Name, .. }));
        }
        draft.set_display_name("Ada");
        assert!(validate(OnboardingStep::Name, &draft).is_ok());
    }

    #[test]
    fn optional_steps_always_pass() {
        let draft = ProfileDraft::new();
        for meta in STEPS.iter().filter(|m| !m.required) {
            assert!(validate(meta.step, &draft).is_ok(), "{} should pass", meta.step);
        }
    }
}
