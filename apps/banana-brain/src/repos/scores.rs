use async_trait::async_trait;

use crate::domain::{DifficultyTier, LeaderboardEntry, NewScore};
use crate::error::AppError;

/// Append-only score record.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Persist one finished round.
    async fn insert(&self, score: NewScore) -> Result<(), AppError>;

    /// Up to `limit` entries for `tier`, score descending then earliest first.
    async fn top_scores(
        &self,
        tier: DifficultyTier,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError>;
}
