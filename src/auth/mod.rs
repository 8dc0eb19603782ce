//! Authentication: credential forms and the signed-in identity.

pub mod session;
pub mod validation;

pub use session::{AuthProvider, AuthSession, Identity};
pub use validation::{validate_reset_email, validate_sign_in, validate_sign_up};
