use async_trait::async_trait;
use tokio::sync::watch;

use crate::auth::{AuthState, Credentials, Session, SignUpOutcome};
use crate::error::AppError;

/// Managed auth provider. Every state change is published on the channel
/// returned by [`AuthService::subscribe`].
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AppError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AppError>;

    async fn sign_out(&self) -> Result<(), AppError>;

    /// Email a recovery link to `email` (already normalized).
    async fn reset_password(&self, email: &str) -> Result<(), AppError>;

    /// Exchange the access token carried by a recovery link for a
    /// [`AuthState::PasswordRecovery`] session.
    async fn recover_session(&self, access_token: &str) -> Result<Session, AppError>;

    /// Needs a signed-in or recovery session.
    async fn update_password(&self, new_password: &str) -> Result<(), AppError>;

    /// A session whose token has expired is dropped here, and subscribers
    /// see [`AuthState::SignedOut`].
    fn current(&self) -> AuthState;

    fn subscribe(&self) -> watch::Receiver<AuthState>;
}
