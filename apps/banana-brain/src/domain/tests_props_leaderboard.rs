//! Property tests for leaderboard ranking.
//!
//! Properties tested:
//! - Scores are non-increasing down the table
//! - Equal scores are ordered by earliest submission
//! - Ranking only reorders

use proptest::prelude::*;

use crate::domain::leaderboard::rank_entries;
use crate::domain::{test_gens, test_prelude};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_ranked_entries_are_ordered(mut entries in test_gens::entries()) {
        let before = entries.len();
        rank_entries(&mut entries);
        prop_assert_eq!(entries.len(), before);

        for pair in entries.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].submitted_at <= pair[1].submitted_at);
            }
        }
    }

    /// Property: ranking twice changes nothing
    #[test]
    fn prop_ranking_is_idempotent(mut entries in test_gens::entries()) {
        rank_entries(&mut entries);
        let once = entries.clone();
        rank_entries(&mut entries);
        prop_assert_eq!(entries, once);
    }
}
