use thiserror::Error;

use crate::errors::domain::{DomainError, PayloadKind, ValidationKind};
use crate::errors::ErrorCode;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Upstream error: {detail}")]
    Upstream { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Error code for any variant.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::Unauthorized { code, .. } => *code,
            AppError::Upstream { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Detail string for any variant.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Validation { detail, .. } => detail,
            AppError::Unauthorized { detail, .. } => detail,
            AppError::Upstream { detail, .. } => detail,
            AppError::Config { detail } => detail,
            AppError::Internal { detail } => detail,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Message shown to the player. Never carries upstream internals for
    /// upstream failures; auth and validation detail is shown as-is.
    pub fn user_message(&self) -> String {
        match self.code() {
            ErrorCode::PuzzleUnavailable | ErrorCode::PuzzleMalformed => {
                "Failed to load puzzle. Please try again.".to_string()
            }
            ErrorCode::LeaderboardUnavailable => {
                "Failed to load scores. Check your network connection.".to_string()
            }
            ErrorCode::ScoreSubmitFailed => "Your score could not be saved.".to_string(),
            ErrorCode::ConfigError | ErrorCode::InternalError => {
                "Something went wrong.".to_string()
            }
            _ => self.detail().to_string(),
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            detail: detail.into(),
        }
    }

    pub fn upstream(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Upstream {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidGuess => ErrorCode::InvalidGuess,
                    ValidationKind::InvalidCard => ErrorCode::InvalidCard,
                    ValidationKind::InvalidEmail => ErrorCode::InvalidEmail,
                    ValidationKind::WeakPassword => ErrorCode::WeakPassword,
                    ValidationKind::InvalidTier => ErrorCode::InvalidTier,
                    ValidationKind::InvalidPolicy => ErrorCode::InvalidPolicy,
                    ValidationKind::Other(_) => ErrorCode::InternalError,
                };
                AppError::invalid(code, detail)
            }
            DomainError::Payload(kind, detail) => match kind {
                PayloadKind::MissingField | PayloadKind::SolutionOutOfRange => {
                    AppError::upstream(ErrorCode::PuzzleMalformed, detail)
                }
                PayloadKind::Other(_) => AppError::internal(detail),
            },
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}
