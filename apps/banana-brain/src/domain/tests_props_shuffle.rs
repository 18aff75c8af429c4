//! Property tests for deck building and the Fisher-Yates shuffle.
//!
//! Properties tested:
//! - A deck holds exactly two of each of the first `pair_count` icons
//! - Shuffling permutes without adding or losing items
//! - Card ids stay unique after the shuffle

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::deck::{build_deck, shuffle, Icon};
use crate::domain::{test_gens, test_prelude};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: two of each icon drawn, none of the others
    #[test]
    fn prop_deck_has_two_of_each_icon(
        tier in test_gens::tier(),
        seed in any::<u64>(),
    ) {
        let pair_count = tier.pair_count();
        let deck = build_deck(pair_count, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(deck.len(), 2 * pair_count);

        let mut counts: BTreeMap<Icon, usize> = BTreeMap::new();
        for card in &deck {
            *counts.entry(card.icon).or_default() += 1;
        }
        prop_assert_eq!(counts.len(), pair_count);
        for icon in &Icon::ALL[..pair_count] {
            prop_assert_eq!(counts.get(icon).copied(), Some(2), "icon {:?}", icon);
        }

        let ids: HashSet<usize> = deck.iter().map(|c| c.id).collect();
        prop_assert_eq!(ids.len(), deck.len());
    }

    /// Property: shuffle is a permutation
    #[test]
    fn prop_shuffle_preserves_multiset(
        mut items in prop::collection::vec(any::<u8>(), 0..64),
        seed in any::<u64>(),
    ) {
        let mut expected = items.clone();
        shuffle(&mut items, &mut ChaCha8Rng::seed_from_u64(seed));
        expected.sort_unstable();
        items.sort_unstable();
        prop_assert_eq!(items, expected);
    }
}
