//! ULID-backed generators for player identities used in tests.

use ulid::Ulid;

/// A unique label in the format `{prefix}-{ulid}`.
///
/// ```
/// use game_test_support::unique_label;
///
/// let a = unique_label("player");
/// let b = unique_label("player");
/// assert_ne!(a, b);
/// assert!(a.starts_with("player-"));
/// ```
pub fn unique_label(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A unique player email in the format `{prefix}-{ulid}@banana.test`.
///
/// Player labels on the leaderboard are the signed-in email, so tests that
/// assert on highlighted rows use this to stay isolated.
pub fn unique_player_email(prefix: &str) -> String {
    format!("{}-{}@banana.test", prefix, Ulid::new()).to_lowercase()
}
