//! OnboardingManager: coordinates the draft, the step sequencer and profile
//! submission for one signed-in user.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::model::ProfileDraft;
use super::sequencer::{Move, StepProgress, StepSequencer};
use super::state::OnboardingStep;
use crate::auth::{AuthSession, Identity};
use crate::error::OnboardingError;
use crate::profile::{ProfileService, UserProfile};

/// Result of a wizard action.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Now on this step.
    Moved(OnboardingStep),
    /// Nothing changed.
    Stayed(OnboardingStep),
    /// The profile was stored; onboarding is over.
    Completed(UserProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Editing,
    Submitting,
    Completed,
}

/// `phase` only records `Editing` or `Completed`; an in-flight submission is
/// tracked by the manager's flag so that dropping the call clears it.
struct SessionState {
    draft: ProfileDraft,
    sequencer: StepSequencer,
    phase: SessionPhase,
}

/// Marks a submission in flight until dropped, whether the submit call
/// finished or was cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn claim(flag: &'a AtomicBool) -> Result<Self, OnboardingError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OnboardingError::SubmissionInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Snapshot for rendering the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub step: OnboardingStep,
    pub index: usize,
    pub total: usize,
    pub phase: SessionPhase,
    pub can_skip: bool,
    pub primary_action: &'static str,
    pub progress: Vec<(OnboardingStep, StepProgress)>,
}

/// Drives one onboarding session.
///
/// All state sits behind a lock so UI handlers can share the manager via
/// `Arc`. The lock is released while a submission is on the wire; the
/// in-flight flag rejects every other action until the submit call resolves
/// or is dropped.
pub struct OnboardingManager {
    identity: Identity,
    service: Arc<dyn ProfileService>,
    state: RwLock<SessionState>,
    submitting: AtomicBool,
}

impl OnboardingManager {
    pub fn new(identity: Identity, service: Arc<dyn ProfileService>) -> Self {
        Self {
            identity,
            service,
            state: RwLock::new(SessionState {
                draft: ProfileDraft::new(),
                sequencer: StepSequencer::new(),
                phase: SessionPhase::Editing,
            }),
            submitting: AtomicBool::new(false),
        }
    }

    /// Start onboarding for whoever is signed in.
    pub async fn start(
        session: &AuthSession,
        service: Arc<dyn ProfileService>,
    ) -> Result<Self, OnboardingError> {
        let identity = session.current().await.ok_or(OnboardingError::NotSignedIn)?;
        info!(user_id = %identity.id, "Onboarding started");
        Ok(Self::new(identity, service))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub async fn current_step(&self) -> OnboardingStep {
        self.state.read().await.sequencer.current()
    }

    pub async fn phase(&self) -> SessionPhase {
        let state = self.state.read().await;
        self.phase_of(&state)
    }

    fn phase_of(&self, state: &SessionState) -> SessionPhase {
        if self.submitting.load(Ordering::Acquire) {
            SessionPhase::Submitting
        } else {
            state.phase
        }
    }

    fn ensure_editable(&self, state: &SessionState) -> Result<(), OnboardingError> {
        match self.phase_of(state) {
            SessionPhase::Editing => Ok(()),
            SessionPhase::Submitting => Err(OnboardingError::SubmissionInFlight),
            SessionPhase::Completed => Err(OnboardingError::Completed),
        }
    }

    /// Copy of the current draft.
    pub async fn draft(&self) -> ProfileDraft {
        self.state.read().await.draft.clone()
    }

    pub async fn status(&self) -> OnboardingStatus {
        let state = self.state.read().await;
        let seq = &state.sequencer;
        let phase = self.phase_of(&state);
        OnboardingStatus {
            step: seq.current(),
            index: seq.index(),
            total: seq.len(),
            phase,
            can_skip: phase == SessionPhase::Editing && seq.can_skip(),
            primary_action: seq.primary_action_label(),
            progress: seq.progress(),
        }
    }

    /// Apply an input handler to the draft.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut ProfileDraft) -> R,
    ) -> Result<R, OnboardingError> {
        let mut state = self.state.write().await;
        self.ensure_editable(&state)?;
        Ok(f(&mut state.draft))
    }

    /// Validate and move forward; on the last step, submit the profile.
    ///
    /// A failed submission leaves the draft and step untouched so the
    /// caller can retry. So does dropping this future mid-submission.
    pub async fn advance(&self) -> Result<Transition, OnboardingError> {
        let (request, _in_flight) = {
            let mut guard = self.state.write().await;
            self.ensure_editable(&guard)?;
            let state = &mut *guard;
            match state.sequencer.advance(&state.draft)? {
                Move::Moved(step) => return Ok(Transition::Moved(step)),
                Move::Stayed(step) => return Ok(Transition::Stayed(step)),
                Move::Submit => (
                    state.draft.to_request(&self.identity),
                    InFlight::claim(&self.submitting)?,
                ),
            }
        };

        info!(user_id = %self.identity.id, "Submitting profile");
        let result = self.service.submit(&request).await;

        let mut state = self.state.write().await;
        match result {
            Ok(profile) => {
                state.phase = SessionPhase::Completed;
                state.draft = ProfileDraft::new();
                info!(user_id = %profile.user_id, "Onboarding complete");
                Ok(Transition::Completed(profile))
            }
            Err(e) => {
                warn!(user_id = %self.identity.id, error = %e, "Profile submission failed");
                Err(OnboardingError::Submission(e))
            }
        }
    }

    /// Step back. No validation.
    pub async fn retreat(&self) -> Result<Transition, OnboardingError> {
        let mut state = self.state.write().await;
        self.ensure_editable(&state)?;
        let mv = state.sequencer.retreat();
        Ok(local_transition(mv, &state.sequencer))
    }

    /// Skip an optional step.
    pub async fn skip(&self) -> Result<Transition, OnboardingError> {
        let mut state = self.state.write().await;
        self.ensure_editable(&state)?;
        let mv = state.sequencer.skip()?;
        Ok(local_transition(mv, &state.sequencer))
    }
}

/// Map a move that never submits (back or skip) onto a transition.
fn local_transition(mv: Move, sequencer: &StepSequencer) -> Transition {
    match mv {
        Move::Moved(step) => Transition::Moved(step),
        Move::Stayed(step) => Transition::Stayed(step),
        Move::Submit => Transition::Stayed(sequencer.current()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::ApiError;
    use crate::onboarding::model::IngredientList;
    use crate::ingredients::IngredientRef;
    use crate::profile::ProfileRequest;

    /// Records submissions; fails while `fail_with` is set.
    #[derive(Default)]
    struct RecordingService {
        submitted: Mutex<Vec<ProfileRequest>>,
        fail_with: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ProfileService for RecordingService {
        async fn submit(&self, profile: &ProfileRequest) -> Result<UserProfile, ApiError> {
            self.submitted.lock().unwrap().push(profile.clone());
            if let Some(message) = self.fail_with.lock().unwrap().clone() {
                return Err(ApiError::Server { status: 500, message });
            }
            Ok(stored(profile))
        }
    }

    fn stored(profile: &ProfileRequest) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            user_id: profile.user_id.clone(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            dietary_goals: profile.dietary_goals.clone(),
            preferences: profile.preferences.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn manager(service: Arc<RecordingService>) -> OnboardingManager {
        OnboardingManager::new(Identity::new("uid-1", "ada@example.com"), service)
    }

    async fn walk_to_last_step(m: &OnboardingManager) {
        m.update(|d| d.set_display_name("Ada")).await.unwrap();
        m.advance().await.unwrap();
        m.advance().await.unwrap();
        m.skip().await.unwrap();
        m.skip().await.unwrap();
        assert_eq!(m.current_step().await, OnboardingStep::Avoid);
    }

    #[tokio::test]
    async fn full_flow_submits_empty_preferences() {
        let service = Arc::new(RecordingService::default());
        let m = manager(service.clone());

        let err = m.advance().await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter your name");
        assert_eq!(m.current_step().await, OnboardingStep::Name);

        m.update(|d| d.set_display_name("Ada")).await.unwrap();
        assert_eq!(m.advance().await.unwrap(), Transition::Moved(OnboardingStep::Goal));
        assert_eq!(m.advance().await.unwrap(), Transition::Moved(OnboardingStep::Restrictions));
        assert_eq!(m.skip().await.unwrap(), Transition::Moved(OnboardingStep::Favorites));
        assert_eq!(m.skip().await.unwrap(), Transition::Moved(OnboardingStep::Avoid));
        assert!(matches!(m.skip().await.unwrap_err(), OnboardingError::AtLastStep));

        let Transition::Completed(profile) = m.advance().await.unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(profile.user_id, "uid-1");
        assert_eq!(m.phase().await, SessionPhase::Completed);

        let submitted = service.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let body = &submitted[0];
        assert_eq!(body.display_name.as_deref(), Some("Ada"));
        assert_eq!(body.dietary_goals.goal, crate::profile::DietaryGoal::Maintenance);
        assert!(body.preferences.dietary_restrictions.is_empty());
        assert!(body.preferences.favorite_ingredients.is_empty());
        assert!(body.preferences.disliked_ingredients.is_empty());
    }

    #[tokio::test]
    async fn failed_submission_keeps_draft_and_allows_retry() {
        let service = Arc::new(RecordingService::default());
        *service.fail_with.lock().unwrap() = Some("Failed to create profile".to_string());
        let m = manager(service.clone());

        walk_to_last_step(&m).await;
        m.update(|d| {
            d.add_ingredient(IngredientList::Avoid, IngredientRef::new("8", "Almonds", &["Nuts"], &[]))
        })
        .await
        .unwrap();
        let before = m.draft().await;

        let err = m.advance().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create profile");
        assert_eq!(m.phase().await, SessionPhase::Editing);
        assert_eq!(m.current_step().await, OnboardingStep::Avoid);
        assert_eq!(m.draft().await, before);

        *service.fail_with.lock().unwrap() = None;
        assert!(matches!(m.advance().await.unwrap(), Transition::Completed(_)));

        let submitted = service.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[1].preferences.disliked_ingredients, vec!["8"]);
    }

    #[tokio::test]
    async fn completed_session_rejects_further_actions() {
        let m = manager(Arc::new(RecordingService::default()));
        walk_to_last_step(&m).await;
        m.advance().await.unwrap();

        assert!(matches!(m.advance().await.unwrap_err(), OnboardingError::Completed));
        assert!(matches!(m.retreat().await.unwrap_err(), OnboardingError::Completed));
        assert!(m.update(|d| d.set_display_name("x")).await.is_err());
        assert_eq!(m.draft().await, ProfileDraft::new());
    }

    /// Holds every submission until released.
    struct GatedService {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProfileService for GatedService {
        async fn submit(&self, profile: &ProfileRequest) -> Result<UserProfile, ApiError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(stored(profile))
        }
    }

    #[tokio::test]
    async fn actions_rejected_while_submitting() {
        let service = Arc::new(GatedService {
            started: Notify::new(),
            release: Notify::new(),
        });
        let m = Arc::new(OnboardingManager::new(
            Identity::new("uid-1", "ada@example.com"),
            service.clone(),
        ));
        walk_to_last_step(&m).await;

        let submitting = {
            let m = Arc::clone(&m);
            tokio::spawn(async move { m.advance().await })
        };
        service.started.notified().await;

        assert_eq!(m.phase().await, SessionPhase::Submitting);
        assert!(matches!(m.advance().await.unwrap_err(), OnboardingError::SubmissionInFlight));
        assert!(matches!(m.retreat().await.unwrap_err(), OnboardingError::SubmissionInFlight));
        assert!(matches!(m.skip().await.unwrap_err(), OnboardingError::SubmissionInFlight));
        assert!(!m.status().await.can_skip);

        service.release.notify_one();
        let outcome = submitting.await.unwrap().unwrap();
        assert!(matches!(outcome, Transition::Completed(_)));
    }

    #[tokio::test]
    async fn abandoned_submission_reopens_editing() {
        let service = Arc::new(GatedService {
            started: Notify::new(),
            release: Notify::new(),
        });
        let m = OnboardingManager::new(Identity::new("uid-1", "ada@example.com"), service.clone());
        walk_to_last_step(&m).await;

        let outcome = tokio::time::timeout(Duration::from_millis(50), m.advance()).await;
        assert!(outcome.is_err());

        assert_eq!(m.phase().await, SessionPhase::Editing);
        assert_eq!(m.current_step().await, OnboardingStep::Avoid);
        assert_eq!(m.draft().await.display_name, "Ada");
        assert_eq!(m.retreat().await.unwrap(), Transition::Moved(OnboardingStep::Favorites));
        assert_eq!(m.advance().await.unwrap(), Transition::Moved(OnboardingStep::Avoid));

        let retry = tokio::spawn({
            let service = Arc::clone(&service);
            async move {
                service.started.notified().await;
                service.release.notify_one();
            }
        });
        assert!(matches!(m.advance().await.unwrap(), Transition::Completed(_)));
        retry.await.unwrap();
    }

    #[tokio::test]
    async fn retreat_is_unvalidated() {
        let m = manager(Arc::new(RecordingService::default()));
        assert_eq!(m.retreat().await.unwrap(), Transition::Stayed(OnboardingStep::Name));

        m.update(|d| d.set_display_name("Ada")).await.unwrap();
        m.advance().await.unwrap();
        m.update(|d| d.set_display_name("")).await.unwrap();
        assert_eq!(m.retreat().await.unwrap(), Transition::Moved(OnboardingStep::Name));
        assert!(m.advance().await.is_err());
    }

    #[tokio::test]
    async fn status_reports_progress() {
        let m = manager(Arc::new(RecordingService::default()));
        let status = m.status().await;
        assert_eq!(status.step, OnboardingStep::Name);
        assert_eq!(status.total, 5);
        assert!(!status.can_skip);
        assert_eq!(status.primary_action, "Next");

        walk_to_last_step(&m).await;
        let status = m.status().await;
        assert_eq!(status.index, 4);
        assert_eq!(status.primary_action, "Complete");
    }
}
