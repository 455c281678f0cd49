// Unit tests for error mapping - DomainError / ReplayError / AiError into AppError
use crate::ai::AiError;
use crate::domain::events::EventType;
use crate::domain::replay::ReplayError;
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::error::AppError;
use crate::errors::ErrorCode;

#[test]
fn maps_validation_kinds() {
    let de = DomainError::validation(
        ValidationKind::Other("VALIDATION_ERROR".into()),
        "bad field",
    );
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);

    let app: AppError = DomainError::validation(ValidationKind::OutOfTurn, "wait").into();
    assert_eq!(app.code().as_str(), "OUT_OF_TURN");
    assert_eq!(app.validation_kind(), Some(&ValidationKind::OutOfTurn));
}

#[test]
fn maps_conflicts() {
    let app: AppError = DomainError::conflict(ConflictKind::GameExists, "taken").into();
    assert_eq!(app.code().as_str(), "GAME_EXISTS");
    assert!(!app.is_conflict());

    let app: AppError = DomainError::conflict(ConflictKind::OptimisticLock, "stale").into();
    assert!(app.is_conflict());

    // Test generic conflict fallback
    let app: AppError = DomainError::conflict(ConflictKind::Other("X".into()), "other").into();
    assert_eq!(app.code(), ErrorCode::Conflict);
}

#[test]
fn maps_not_found() {
    let app: AppError = DomainError::not_found(NotFoundKind::Game, "no game").into();
    assert_eq!(app.code(), ErrorCode::GameNotFound);
    let app: AppError = DomainError::not_found(NotFoundKind::Player, "no player").into();
    assert_eq!(app.code(), ErrorCode::PlayerNotFound);
}

#[test]
fn maps_infra() {
    let app: AppError = DomainError::infra(InfraErrorKind::EventLogUnavailable, "down").into();
    assert_eq!(app.code(), ErrorCode::EventLogUnavailable);
}

#[test]
fn maps_replay_and_ai_failures() {
    let app: AppError = ReplayError::MissingGameCreated {
        found: EventType::DrawFromStock,
    }
    .into();
    assert_eq!(app.code(), ErrorCode::ReplayFailed);

    let app: AppError = AiError::InvalidMove("none".into()).into();
    assert_eq!(app.code(), ErrorCode::AiFailure);
    assert!(app.to_string().contains("AI invalid move"));
}
