use std::fmt;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::logging::Redacted;

/// A signed-in player. The email doubles as the leaderboard label.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub expires_at: Option<OffsetDateTime>,
}

impl Session {
    pub fn player_label(&self) -> &str {
        &self.email
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &Redacted(&self.email))
            .field("access_token", &"[REDACTED_TOKEN]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// What the auth service currently says about the player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Session),
    /// Arrived through a password-recovery link; only a password update is allowed.
    PasswordRecovery(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::SignedOut => None,
            AuthState::SignedIn(s) | AuthState::PasswordRecovery(s) => Some(s),
        }
    }

    /// Sign out if the session's token ran out by `now`. Returns whether
    /// anything changed, so it can drive `watch::Sender::send_if_modified`.
    pub fn expire_if_stale(&mut self, now: OffsetDateTime) -> bool {
        if self.session().is_some_and(|s| s.is_expired_at(now)) {
            *self = AuthState::SignedOut;
            return true;
        }
        false
    }
}

/// Sign-up either signs the player in or waits on an emailed confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn session(expires_at: Option<OffsetDateTime>) -> Session {
        Session {
            user_id: Uuid::nil(),
            email: "kim@banana.test".into(),
            access_token: "eyJhbGciOiJIUzI1NiJ9.payload-part.signature-part".into(),
            expires_at,
        }
    }

    #[test]
    fn expiry_is_inclusive() {
        let s = session(Some(datetime!(2025-01-01 0:00 UTC)));
        assert!(s.is_expired_at(datetime!(2025-01-01 0:00 UTC)));
        assert!(!s.is_expired_at(datetime!(2024-12-31 23:59 UTC)));
        assert!(!session(None).is_expired_at(datetime!(2100-01-01 0:00 UTC)));
    }

    #[test]
    fn debug_never_prints_token() {
        let shown = format!("{:?}", session(None));
        assert!(!shown.contains("payload-part"));
        assert!(shown.contains("k***@banana.test"));
    }

    #[test]
    fn recovery_state_exposes_session() {
        let s = session(None);
        assert_eq!(AuthState::PasswordRecovery(s.clone()).session(), Some(&s));
        assert_eq!(AuthState::SignedOut.session(), None);
    }

    #[test]
    fn stale_session_signs_out_once() {
        let now = datetime!(2025-01-01 0:00 UTC);
        let mut state = AuthState::SignedIn(session(Some(datetime!(2024-12-31 23:00 UTC))));
        assert!(state.expire_if_stale(now));
        assert_eq!(state, AuthState::SignedOut);
        assert!(!state.expire_if_stale(now));

        let mut fresh = AuthState::SignedIn(session(Some(datetime!(2025-01-01 1:00 UTC))));
        assert!(!fresh.expire_if_stale(now));
        assert!(fresh.session().is_some());
    }
}
