#![allow(dead_code)]

use std::sync::Arc;

use banana_brain::adapters::{InMemoryAuth, InMemoryScoreStore, ScriptedPuzzleSource};
use banana_brain::domain::{Card, DifficultyTier, GameMode, Icon, MatchBoard, RoundConfig};
use banana_brain::{AppState, GameSettings};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    game_test_support::logging::init();
}

/// In-memory app with handles kept for assertions.
pub struct TestApp {
    pub state: AppState,
    pub puzzles: Arc<ScriptedPuzzleSource>,
    pub scores: Arc<InMemoryScoreStore>,
    pub auth: Arc<InMemoryAuth>,
}

pub fn test_app(mode: GameMode, puzzles: ScriptedPuzzleSource) -> TestApp {
    let puzzles = Arc::new(puzzles);
    let scores = Arc::new(InMemoryScoreStore::new());
    let auth = Arc::new(InMemoryAuth::default());
    let settings = GameSettings {
        mode,
        shuffle_seed: Some(7),
        ..GameSettings::default()
    };
    let state = AppState::new(puzzles.clone(), scores.clone(), auth.clone(), settings);
    TestApp {
        state,
        puzzles,
        scores,
        auth,
    }
}

/// Unshuffled board: pairs sit at (i, i + pair_count).
pub fn ordered_board(tier: DifficultyTier) -> MatchBoard {
    let icons = &Icon::ALL[..tier.pair_count()];
    let cards = icons
        .iter()
        .chain(icons.iter())
        .enumerate()
        .map(|(id, icon)| Card {
            id,
            icon: *icon,
            is_flipped: false,
            is_matched: false,
        })
        .collect();
    MatchBoard::with_cards(RoundConfig::for_mode(tier, GameMode::CardMatch), cards)
}
