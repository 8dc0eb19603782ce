//! Mindful Meals: onboarding wizard core and profile/ingredient backend.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ingredients;
pub mod onboarding;
pub mod profile;
pub mod server;
pub mod store;
