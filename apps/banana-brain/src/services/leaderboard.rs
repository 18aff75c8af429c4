//! Leaderboard screen state: top entries for the selected tier.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{is_latest_submission, rank_entries, DifficultyTier, LeaderboardEntry, NewScore};
use crate::error::AppError;
use crate::repos::ScoreStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based.
    pub rank: usize,
    pub medal: Option<Medal>,
    pub entry: LeaderboardEntry,
    /// Row matches the player's latest submission.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardStatus {
    Loading,
    Ready(Vec<LeaderboardRow>),
    /// The tier has no scores yet.
    Empty,
    /// Retryable; no placeholder rows are shown.
    Failed { message: String },
}

/// Top `limit` entries for `tier`, ranked.
pub async fn fetch_top(
    store: &dyn ScoreStore,
    tier: DifficultyTier,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let mut entries = store.top_scores(tier, limit).await?;
    rank_entries(&mut entries);
    entries.truncate(limit);
    Ok(entries)
}

pub struct LeaderboardViewModel {
    scores: Arc<dyn ScoreStore>,
    tier: DifficultyTier,
    limit: usize,
    latest: Option<NewScore>,
    status: LeaderboardStatus,
}

impl LeaderboardViewModel {
    /// Starts on the tier of the round just played. Call [`Self::load`] to fetch.
    pub fn new(
        scores: Arc<dyn ScoreStore>,
        tier: DifficultyTier,
        limit: usize,
        latest: Option<NewScore>,
    ) -> Self {
        Self {
            scores,
            tier,
            limit,
            latest,
            status: LeaderboardStatus::Loading,
        }
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn status(&self) -> &LeaderboardStatus {
        &self.status
    }

    pub fn latest(&self) -> Option<&NewScore> {
        self.latest.as_ref()
    }

    pub async fn load(&mut self) -> &LeaderboardStatus {
        self.status = LeaderboardStatus::Loading;
        self.status = match fetch_top(self.scores.as_ref(), self.tier, self.limit).await {
            Ok(entries) if entries.is_empty() => LeaderboardStatus::Empty,
            Ok(entries) => LeaderboardStatus::Ready(self.rows(entries)),
            Err(e) => {
                warn!(code = %e.code(), error = %e, tier = %self.tier, "Leaderboard fetch failed");
                LeaderboardStatus::Failed {
                    message: e.user_message(),
                }
            }
        };
        debug!(tier = %self.tier, "Leaderboard loaded");
        &self.status
    }

    /// Switch tabs. Fetches only when the tier actually changes.
    pub async fn select_tier(&mut self, tier: DifficultyTier) -> &LeaderboardStatus {
        if tier != self.tier || self.status == LeaderboardStatus::Loading {
            self.tier = tier;
            return self.load().await;
        }
        &self.status
    }

    /// Fetch again after a failure. A loaded table is left alone.
    pub async fn retry(&mut self) -> &LeaderboardStatus {
        if matches!(self.status, LeaderboardStatus::Failed { .. }) {
            return self.load().await;
        }
        &self.status
    }

    fn rows(&self, entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardRow> {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                medal: Medal::for_rank(i + 1),
                highlighted: self
                    .latest
                    .as_ref()
                    .is_some_and(|latest| is_latest_submission(&entry, latest)),
                entry,
            })
            .collect()
    }
}
