use async_trait::async_trait;

use crate::domain::Puzzle;
use crate::error::AppError;

/// Supplies one puzzle per call.
///
/// Failures are reported as retryable `PUZZLE_UNAVAILABLE` or
/// `PUZZLE_MALFORMED` errors; the round stays in loading until a retry.
#[async_trait]
pub trait PuzzleSource: Send + Sync {
    async fn fetch_puzzle(&self) -> Result<Puzzle, AppError>;
}
