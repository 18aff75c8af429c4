//! Error codes for Banana Brain.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and are what log lines and
//! user-facing notices carry.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input boundary
    /// Guess is not a single digit
    InvalidGuess,
    /// Card index is out of range or not selectable
    InvalidCard,
    /// Email does not look like an address
    InvalidEmail,
    /// Password below the minimum length
    WeakPassword,
    /// Unknown difficulty tier
    InvalidTier,
    /// Round policy combination is not playable
    InvalidPolicy,
    /// Action not offered on the current screen
    InvalidAction,

    // Auth
    /// Auth service rejected the request
    AuthFailed,
    /// Operation needs a signed-in player
    SessionMissing,

    // Upstream services
    /// Puzzle API unreachable or returned an error status
    PuzzleUnavailable,
    /// Puzzle API payload missing or malformed fields
    PuzzleMalformed,
    /// Score could not be persisted
    ScoreSubmitFailed,
    /// Leaderboard query failed
    LeaderboardUnavailable,

    // System
    ConfigError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidGuess => "INVALID_GUESS",
            Self::InvalidCard => "INVALID_CARD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidTier => "INVALID_TIER",
            Self::InvalidPolicy => "INVALID_POLICY",
            Self::InvalidAction => "INVALID_ACTION",

            Self::AuthFailed => "AUTH_FAILED",
            Self::SessionMissing => "SESSION_MISSING",

            Self::PuzzleUnavailable => "PUZZLE_UNAVAILABLE",
            Self::PuzzleMalformed => "PUZZLE_MALFORMED",
            Self::ScoreSubmitFailed => "SCORE_SUBMIT_FAILED",
            Self::LeaderboardUnavailable => "LEADERBOARD_UNAVAILABLE",

            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Upstream failures the player can retry from the same screen.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PuzzleUnavailable
                | Self::PuzzleMalformed
                | Self::LeaderboardUnavailable
                | Self::ScoreSubmitFailed
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
