//! Player identity: validated credentials and the signed-in session.

pub mod credentials;
pub mod session;

pub use credentials::{normalize_email, Credentials, MIN_PASSWORD_LEN};
pub use session::{AuthState, Session, SignUpOutcome};
