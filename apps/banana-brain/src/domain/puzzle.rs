//! Puzzle payloads and answer parsing.

use serde_json::Value;

use crate::errors::domain::{DomainError, PayloadKind, ValidationKind};

/// Highest digit a puzzle solution can take.
pub const MAX_SOLUTION: u8 = 9;

/// One visual puzzle and its single-digit answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Image URI (or inline data) shown to the player.
    pub image_ref: String,
    pub solution: u8,
}

impl Puzzle {
    pub fn new(image_ref: impl Into<String>, solution: u8) -> Result<Self, DomainError> {
        if solution > MAX_SOLUTION {
            return Err(DomainError::payload(
                PayloadKind::SolutionOutOfRange,
                format!("Solution {solution} is outside 0..={MAX_SOLUTION}"),
            ));
        }
        Ok(Self {
            image_ref: image_ref.into(),
            solution,
        })
    }

    pub fn is_solved_by(&self, candidate: u8) -> bool {
        self.solution == candidate
    }
}

/// Build a puzzle from a raw API body `{ "question": ..., "solution": ... }`.
///
/// `solution` may arrive as a number or a numeric string. A missing or empty
/// question, a missing solution, or anything that is not a digit in range is
/// a payload error.
pub fn puzzle_from_json(body: &Value) -> Result<Puzzle, DomainError> {
    let question = body
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| DomainError::payload(PayloadKind::MissingField, "question missing"))?;

    let solution = match body.get("solution") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DomainError::payload(PayloadKind::MissingField, "solution missing"))?;

    let solution = u8::try_from(solution)
        .ok()
        .filter(|s| *s <= MAX_SOLUTION)
        .ok_or_else(|| {
            DomainError::payload(
                PayloadKind::SolutionOutOfRange,
                format!("Solution {solution} is outside 0..={MAX_SOLUTION}"),
            )
        })?;

    Puzzle::new(question, solution)
}

/// Parse the player's typed answer. Only a single digit is accepted.
pub fn parse_guess(raw: &str) -> Result<u8, DomainError> {
    let trimmed = raw.trim();
    let invalid = || {
        DomainError::validation(
            ValidationKind::InvalidGuess,
            format!("Enter a number between 0 and {MAX_SOLUTION}"),
        )
    };
    if trimmed.is_empty() || trimmed.len() > 1 {
        return Err(invalid());
    }
    trimmed
        .parse::<u8>()
        .ok()
        .filter(|d| *d <= MAX_SOLUTION)
        .ok_or_else(invalid)
}
