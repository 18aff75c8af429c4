//! Domain-level error type used by the pure game logic.
//!
//! This type knows nothing about HTTP or the managed services. Services
//! return `Result<T, crate::error::AppError>` and convert with the
//! provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Validation kinds raised at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidGuess,
    InvalidCard,
    InvalidEmail,
    WeakPassword,
    InvalidTier,
    InvalidPolicy,
    Other(String),
}

/// Kinds of malformed upstream data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PayloadKind {
    MissingField,
    SolutionOutOfRange,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input or rule violation
    Validation(ValidationKind, String),
    /// Data from a collaborator that cannot be used
    Payload(PayloadKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Payload(kind, d) => write!(f, "payload {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn payload(kind: PayloadKind, detail: impl Into<String>) -> Self {
        Self::Payload(kind, detail.into())
    }
}
