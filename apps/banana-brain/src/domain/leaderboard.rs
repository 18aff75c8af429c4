use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::tier::DifficultyTier;

/// One persisted score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub player_label: String,
    pub score: u32,
    pub tier: DifficultyTier,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

/// Insert payload; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub player_label: String,
    pub score: u32,
    pub tier: DifficultyTier,
}

/// Score descending, then earliest submission first.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.submitted_at.cmp(&b.submitted_at))
    });
}

/// Best-effort: entries carry no submission id, so label + score + tier is
/// the closest identity available.
pub fn is_latest_submission(entry: &LeaderboardEntry, latest: &NewScore) -> bool {
    entry.player_label == latest.player_label
        && entry.score == latest.score
        && entry.tier == latest.tier
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn entry(label: &str, score: u32, at: OffsetDateTime) -> LeaderboardEntry {
        LeaderboardEntry {
            id: Uuid::new_v4(),
            player_label: label.into(),
            score,
            tier: DifficultyTier::Easy,
            submitted_at: at,
        }
    }

    #[test]
    fn ties_break_on_earlier_submission() {
        let mut entries = vec![
            entry("late", 50, datetime!(2024-03-01 12:00 UTC)),
            entry("top", 90, datetime!(2024-03-02 12:00 UTC)),
            entry("early", 50, datetime!(2024-02-01 12:00 UTC)),
        ];
        rank_entries(&mut entries);
        let labels: Vec<_> = entries.iter().map(|e| e.player_label.as_str()).collect();
        assert_eq!(labels, ["top", "early", "late"]);
    }

    #[test]
    fn highlight_requires_label_score_and_tier() {
        let e = entry("a@b.test", 40, datetime!(2024-01-01 0:00 UTC));
        let latest = NewScore {
            player_label: "a@b.test".into(),
            score: 40,
            tier: DifficultyTier::Easy,
        };
        assert!(is_latest_submission(&e, &latest));
        assert!(!is_latest_submission(
            &e,
            &NewScore {
                tier: DifficultyTier::Hard,
                ..latest.clone()
            }
        ));
        assert!(!is_latest_submission(&e, &NewScore { score: 41, ..latest }));
    }
}
