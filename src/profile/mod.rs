//! User profiles: documents, the submission contract, and backend routes.

pub mod model;
pub mod routes;
pub mod service;

pub use model::{DietaryGoal, DietaryGoals, Preferences, ProfileRequest, UserProfile};
pub use routes::profile_routes;
pub use service::ProfileService;
