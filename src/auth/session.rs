//! Process-scoped sign-in state.
//!
//! The identity provider (hosted auth service) sits behind [`AuthProvider`].
//! [`AuthSession`] is created once at app start, records whoever is signed
//! in, and hands the rest of the app read-only [`Identity`] snapshots.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use super::validation::{validate_reset_email, validate_sign_in, validate_sign_up};
use crate::error::AuthError;

/// The signed-in user as the onboarding core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Hosted identity provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
}

/// Owns the current identity for the lifetime of the process.
pub struct AuthSession {
    provider: Arc<dyn AuthProvider>,
    current: RwLock<Option<Identity>>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
        }
    }

    /// Snapshot of the signed-in user, if any.
    pub async fn current(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Validate the form, create the account, and sign in as the new user.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<Identity, AuthError> {
        validate_sign_up(email, password, confirm_password)?;
        let identity = self.provider.sign_up(email, password).await?;
        info!(user_id = %identity.id, "Account created");
        *self.current.write().await = Some(identity.clone());
        Ok(identity)
    }

    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        validate_sign_in(email, password)?;
        let identity = self.provider.sign_in(email, password).await?;
        info!(user_id = %identity.id, "Signed in");
        *self.current.write().await = Some(identity.clone());
        Ok(identity)
    }

    /// Sign out and drop the identity. The local identity is cleared only
    /// once the provider confirms.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        if let Some(identity) = self.current.write().await.take() {
            info!(user_id = %identity.id, "Signed out");
        }
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        validate_reset_email(email)?;
        self.provider.send_password_reset(email).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use secrecy::ExposeSecret;

    use super::*;

    #[derive(Default)]
    struct FakeProvider {
        accounts: Mutex<Vec<(String, String)>>,
        resets: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn sign_up(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.iter().any(|(e, _)| e == email) {
                return Err(AuthError::Provider {
                    code: "auth/email-already-in-use".to_string(),
                    message: "Email already in use".to_string(),
                });
            }
            accounts.push((email.to_string(), password.expose_secret().to_string()));
            Ok(Identity::new(format!("uid-{}", accounts.len()), email))
        }

        async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
            let accounts = self.accounts.lock().unwrap();
            accounts
                .iter()
                .position(|(e, p)| e == email && p == password.expose_secret())
                .map(|i| Identity::new(format!("uid-{}", i + 1), email))
                .ok_or_else(|| AuthError::Provider {
                    code: "auth/invalid-credential".to_string(),
                    message: "Invalid credentials".to_string(),
                })
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            Ok(())
        }

        async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
            self.resets.lock().unwrap().push(email.to_string());
            Ok(())
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn sign_up_sets_identity() {
        let session = AuthSession::new(Arc::new(FakeProvider::default()));
        assert!(session.current().await.is_none());

        let identity = session
            .sign_up("ada@example.com", &secret("lovelace1"), &secret("lovelace1"))
            .await
            .unwrap();
        assert_eq!(identity, Identity::new("uid-1", "ada@example.com"));
        assert_eq!(session.current().await, Some(identity));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_provider() {
        let provider = Arc::new(FakeProvider::default());
        let session = AuthSession::new(provider.clone());

        let err = session
            .sign_up("ada@example.com", &secret("lovelace1"), &secret("lovelace2"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
        assert!(provider.accounts.lock().unwrap().is_empty());
        assert!(!session.is_signed_in().await);
    }

    #[tokio::test]
    async fn sign_in_then_out() {
        let session = AuthSession::new(Arc::new(FakeProvider::default()));
        session
            .sign_up("ada@example.com", &secret("lovelace1"), &secret("lovelace1"))
            .await
            .unwrap();
        session.sign_out().await.unwrap();
        assert!(!session.is_signed_in().await);

        assert!(session.sign_in("ada@example.com", &secret("wrong")).await.is_err());
        assert!(!session.is_signed_in().await);

        let identity = session.sign_in("ada@example.com", &secret("lovelace1")).await.unwrap();
        assert_eq!(identity.id, "uid-1");
        assert!(session.is_signed_in().await);
    }

    #[tokio::test]
    async fn reset_requires_email() {
        let provider = Arc::new(FakeProvider::default());
        let session = AuthSession::new(provider.clone());
        assert!(session.reset_password("").await.is_err());
        session.reset_password("ada@example.com").await.unwrap();
        assert_eq!(*provider.resets.lock().unwrap(), vec!["ada@example.com".to_string()]);
    }
}
