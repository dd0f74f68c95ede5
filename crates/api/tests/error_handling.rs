//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server or
//! database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use skill_loop_api::error::AppError;
use skill_loop_core::error::CoreError;
use skill_loop_journey::EngineError;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Journey",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Journey with id 42 not found");
}

#[tokio::test]
async fn test_validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation(
        "Cannot transition journey from 'completed' to 'paused'".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Cannot transition journey from 'completed' to 'paused'");
}

#[tokio::test]
async fn test_bad_request_error_returns_400() {
    let err = AppError::BadRequest("missing body".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "missing body");
}

#[tokio::test]
async fn test_conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("Journey 7 is paused and cannot advance".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_auth_errors_map_to_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("Missing token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("Admin role required".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Admin role required");
}

#[tokio::test]
async fn test_invariant_violation_returns_500_with_detail() {
    let err = AppError::Core(CoreError::InvariantViolation(
        "Journey 3 has 2 active phases".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INVARIANT_VIOLATION");
    assert_eq!(json["error"], "Journey 3 has 2 active phases");
}

#[tokio::test]
async fn test_internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::Core(CoreError::Internal("connection string leaked".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn test_row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_engine_errors_convert_transparently() {
    let err: AppError = EngineError::Core(CoreError::Conflict("no mentor".into())).into();
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "no mentor");

    let err: AppError = EngineError::Database(sqlx::Error::RowNotFound).into();
    let (status, _) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
