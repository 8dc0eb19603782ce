//! Onboarding: the multi-step profile-setup wizard.
//!
//! A new user walks a fixed sequence of steps (name, goal, restrictions,
//! favorites, avoid). Answers accumulate in a `ProfileDraft`; the
//! `StepSequencer` gates forward moves on per-step validation, and the
//! `OnboardingManager` submits the finished draft to the profile service.

pub mod manager;
pub mod model;
pub mod sequencer;
pub mod state;
pub mod validation;

pub use manager::{OnboardingManager, OnboardingStatus, SessionPhase, Transition};
pub use model::{GOAL_OPTIONS, IngredientList, ProfileDraft, RESTRICTION_OPTIONS};
pub use sequencer::{Move, StepProgress, StepSequencer};
pub use state::{OnboardingStep, STEPS, StepMetadata};
pub use validation::validate;
