//! Step sequencer: forward, back and skip moves over [`STEPS`].

use serde::Serialize;
use tracing::debug;

use super::model::ProfileDraft;
use super::state::{OnboardingStep, STEPS};
use super::validation::validate;
use crate::error::OnboardingError;

/// Outcome of a sequencer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Now on this step.
    Moved(OnboardingStep),
    /// Nothing changed; still on this step.
    Stayed(OnboardingStep),
    /// The last step validated; the draft should be submitted.
    Submit,
}

/// How a step renders in the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepProgress {
    Completed,
    Current,
    Upcoming,
}

/// Tracks the current step. The index is always within `STEPS` and only
/// ever moves by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSequencer {
    index: usize,
}

impl StepSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OnboardingStep {
        STEPS[self.index].step
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        STEPS.len()
    }

    pub fn is_empty(&self) -> bool {
        STEPS.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index == STEPS.len() - 1
    }

    /// Validate the current step, then move forward. On the last step a
    /// passing validation yields [`Move::Submit`] and the index stays put.
    pub fn advance(&mut self, draft: &ProfileDraft) -> Result<Move, OnboardingError> {
        let step = self.current();
        validate(step, draft)?;

        if self.is_last() {
            debug!(step = %step, "Last step validated");
            return Ok(Move::Submit);
        }

        self.index += 1;
        debug!(from = %step, to = %self.current(), "Advanced");
        Ok(Move::Moved(self.current()))
    }

    /// Step back without validation. No-op on the first step.
    pub fn retreat(&mut self) -> Move {
        if self.index == 0 {
            return Move::Stayed(self.current());
        }
        self.index -= 1;
        debug!(to = %self.current(), "Retreated");
        Move::Moved(self.current())
    }

    /// Move forward past an optional step without validating it.
    pub fn skip(&mut self) -> Result<Move, OnboardingError> {
        let meta = &STEPS[self.index];
        if meta.required {
            return Err(OnboardingError::SkipRequired { step: meta.step });
        }
        if self.is_last() {
            return Err(OnboardingError::AtLastStep);
        }
        self.index += 1;
        debug!(from = %meta.step, to = %self.current(), "Skipped");
        Ok(Move::Moved(self.current()))
    }

    /// Whether the current step offers a skip action.
    pub fn can_skip(&self) -> bool {
        !STEPS[self.index].required && !self.is_last()
    }

    /// Per-step state for the progress indicator.
    pub fn progress(&self) -> Vec<(OnboardingStep, StepProgress)> {
        STEPS
            .iter()
            .enumerate()
            .map(|(i, meta)| {
                let state = match i.cmp(&self.index) {
                    std::cmp::Ordering::Less => StepProgress::Completed,
                    std::cmp::Ordering::Equal => StepProgress::Current,
                    std::cmp::Ordering::Greater => StepProgress::Upcoming,
                };
                (meta.step, state)
            })
            .collect()
    }

    /// Label for the forward button.
    pub fn primary_action_label(&self) -> &'static str {
        if self.is_last() { "Complete" } else { "Next" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::state::OnboardingStep::*;

    fn named(name: &str) -> ProfileDraft {
        let mut draft = ProfileDraft::new();
        draft.set_display_name(name);
        draft
    }

    /// Sequencer positioned on `step`.
    fn at(step: OnboardingStep) -> StepSequencer {
        StepSequencer { index: step.index() }
    }

    #[test]
    fn starts_on_name() {
        let seq = StepSequencer::new();
        assert_eq!(seq.current(), Name);
        assert_eq!(seq.index(), 0);
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn required_step_with_invalid_input_stays() {
        for meta in STEPS.iter().filter(|m| m.required) {
            let mut seq = at(meta.step);
            let err = seq.advance(&ProfileDraft::new()).unwrap_err();
            assert!(matches!(err, OnboardingError::ValidationFailed { .. }));
            assert_eq!(seq.current(), meta.step);
        }
    }

    #[test]
    fn retreat_then_advance_returns_to_start() {
        let draft = named("Ada");
        for meta in STEPS {
            let mut seq = at(meta.step);
            if seq.retreat() == Move::Stayed(meta.step) {
                assert_eq!(meta.step, Name);
                continue;
            }
            assert_eq!(seq.advance(&draft).unwrap(), Move::Moved(meta.step));
            assert_eq!(seq.current(), meta.step);
        }
    }

    #[test]
    fn retreat_on_first_step_is_noop() {
        let mut seq = StepSequencer::new();
        assert_eq!(seq.retreat(), Move::Stayed(Name));
        assert_eq!(seq.index(), 0);
    }

    #[test]
    fn skip_on_required_step_rejected() {
        let mut seq = StepSequencer::new();
        let err = seq.skip().unwrap_err();
        assert!(matches!(err, OnboardingError::SkipRequired { step: Name }));
        assert_eq!(seq.current(), Name);
        assert!(!seq.can_skip());
    }

    #[test]
    fn skip_on_optional_step_ignores_data() {
        let empty = ProfileDraft::new();
        for step in [Goal, Restrictions, Favorites] {
            let mut seq = at(step);
            assert!(seq.can_skip());
            assert_eq!(seq.skip().unwrap(), Move::Moved(step.next().unwrap()));
            // advance with the same (empty) draft also works on optional steps
            let mut seq = at(step);
            assert!(seq.advance(&empty).is_ok());
        }
    }

    #[test]
    fn skip_on_last_step_rejected() {
        let mut seq = at(Avoid);
        assert!(matches!(seq.skip().unwrap_err(), OnboardingError::AtLastStep));
        assert_eq!(seq.current(), Avoid);
        assert!(!seq.can_skip());
    }

    #[test]
    fn advance_on_last_step_requests_submit() {
        let mut seq = at(Avoid);
        assert_eq!(seq.advance(&named("Ada")).unwrap(), Move::Submit);
        assert_eq!(seq.current(), Avoid);
    }

    #[test]
    fn name_goal_then_skip_to_submit() {
        let mut draft = ProfileDraft::new();
        let mut seq = StepSequencer::new();

        let err = seq.advance(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Please enter your name");
        assert_eq!(seq.current(), Name);

        draft.set_display_name("Ada");
        assert_eq!(seq.advance(&draft).unwrap(), Move::Moved(Goal));
        assert_eq!(seq.advance(&draft).unwrap(), Move::Moved(Restrictions));
        assert_eq!(seq.skip().unwrap(), Move::Moved(Favorites));
        assert_eq!(seq.skip().unwrap(), Move::Moved(Avoid));
        assert!(seq.skip().is_err());
        assert_eq!(seq.advance(&draft).unwrap(), Move::Submit);
    }

    #[test]
    fn progress_and_labels() {
        let seq = at(Restrictions);
        let progress: Vec<_> = seq.progress().into_iter().map(|(_, p)| p).collect();
        assert_eq!(
            progress,
            vec![
                StepProgress::Completed,
                StepProgress::Completed,
                StepProgress::Current,
                StepProgress::Upcoming,
                StepProgress::Upcoming,
            ]
        );
        assert_eq!(seq.primary_action_label(), "Next");
        assert_eq!(at(Avoid).primary_action_label(), "Complete");
    }
}
