//! Card deck for the matching board.

use rand::Rng;

use crate::errors::domain::{DomainError, ValidationKind};

/// Face icons, in the order pairs are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Icon {
    Banana,
    MonitorPlay,
    Clock,
    Zap,
    Brain,
    Ban,
    CheckCircle,
    RotateCcw,
}

impl Icon {
    pub const ALL: [Icon; 8] = [
        Icon::Banana,
        Icon::MonitorPlay,
        Icon::Clock,
        Icon::Zap,
        Icon::Brain,
        Icon::Ban,
        Icon::CheckCircle,
        Icon::RotateCcw,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Icon::Banana => "banana",
            Icon::MonitorPlay => "monitor",
            Icon::Clock => "clock",
            Icon::Zap => "zap",
            Icon::Brain => "brain",
            Icon::Ban => "ban",
            Icon::CheckCircle => "check",
            Icon::RotateCcw => "rotate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Position in the unshuffled deck; stable across the shuffle.
    pub id: usize,
    pub icon: Icon,
    pub is_flipped: bool,
    pub is_matched: bool,
}

/// Fisher-Yates shuffle drawing from `rng`.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Two cards for each of the first `pair_count` icons, shuffled.
pub fn build_deck<R: Rng>(pair_count: usize, rng: &mut R) -> Result<Vec<Card>, DomainError> {
    if pair_count == 0 || pair_count > Icon::ALL.len() {
        return Err(DomainError::validation(
            ValidationKind::Other("PAIR_COUNT".into()),
            format!("pair_count must be 1..={}", Icon::ALL.len()),
        ));
    }

    let icons = &Icon::ALL[..pair_count];
    let mut deck: Vec<Card> = icons
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
    shuffle(&mut deck, rng);
    Ok(deck)
}
