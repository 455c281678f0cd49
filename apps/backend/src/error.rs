use thiserror::Error;

use crate::ai::AiError;
use crate::domain::replay::ReplayError;
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::services::event_log::EventLogError;

/// Service-level error returned by the turn controller, AI coordinator and
/// configuration loaders.
///
/// Validation and conflict variants are expected results that callers show
/// to the acting player or retry; the remaining variants are serious.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation {
        code: ErrorCode,
        kind: ValidationKind,
        detail: String,
    },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Replay failed: {0}")]
    Replay(#[from] ReplayError),
    #[error("Event log unavailable: {detail}")]
    EventLog { detail: String },
    #[error("Data corruption: {detail}")]
    DataCorruption { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Helper method to extract error code from any error variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Replay(_) => ErrorCode::ReplayFailed,
            AppError::EventLog { .. } => ErrorCode::EventLogUnavailable,
            AppError::DataCorruption { .. } => ErrorCode::DataCorruption,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    pub fn invalid(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::from(&kind),
            kind,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Stale `expected_version`: the caller must reload and resubmit.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::Conflict {
                code: ErrorCode::OptimisticLock,
                ..
            }
        )
    }

    /// The validation kind, if this is a rejected move.
    pub fn validation_kind(&self) -> Option<&ValidationKind> {
        match self {
            AppError::Validation { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => AppError::invalid(kind, detail),
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    ConflictKind::GameExists => ErrorCode::GameExists,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Game => ErrorCode::GameNotFound,
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::DataCorruption => AppError::DataCorruption { detail },
                InfraErrorKind::EventLogUnavailable => AppError::EventLog { detail },
                InfraErrorKind::Other(_) => AppError::internal(ErrorCode::Internal, detail),
            },
        }
    }
}

impl From<EventLogError> for AppError {
    fn from(err: EventLogError) -> Self {
        match err {
            EventLogError::Conflict { expected, actual } => AppError::conflict(
                ErrorCode::OptimisticLock,
                format!(
                    "Game version mismatch: expected {expected}, but stream has version {actual}"
                ),
            ),
            EventLogError::SequenceMismatch { .. } => {
                AppError::internal(ErrorCode::Internal, err.to_string())
            }
            EventLogError::Unavailable(detail) => AppError::EventLog { detail },
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        AppError::internal(ErrorCode::AiFailure, format!("AI error: {err}"))
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}
