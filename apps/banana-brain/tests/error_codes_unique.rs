use std::collections::HashSet;

use banana_brain::ErrorCode;

#[test]
fn error_codes_are_unique() {
    let all = [
        // Keep in sync with ErrorCode enum variants
        ErrorCode::InvalidGuess,
        ErrorCode::InvalidCard,
        ErrorCode::InvalidEmail,
        ErrorCode::WeakPassword,
        ErrorCode::InvalidTier,
        ErrorCode::InvalidPolicy,
        ErrorCode::InvalidAction,
        ErrorCode::AuthFailed,
        ErrorCode::SessionMissing,
        ErrorCode::PuzzleUnavailable,
        ErrorCode::PuzzleMalformed,
        ErrorCode::ScoreSubmitFailed,
        ErrorCode::LeaderboardUnavailable,
        ErrorCode::ConfigError,
        ErrorCode::InternalError,
    ];

    let mut seen = HashSet::new();
    for code in all {
        let s = code.as_str();
        assert!(seen.insert(s), "Duplicate error code string: {s}");
    }
}
