use axum::http::StatusCode;
use carebook_api::middleware::{
    auth::{JwtAuth, issue_token},
    error_handling::map_error,
};
use carebook_core::{errors::ClinicError, models::auth::Role};
use chrono::Duration;
use rstest::rstest;

use crate::test_utils::{JWT_SECRET, caller_with_role};

#[rstest]
#[case(ClinicError::NotFound("Doctor not found".to_string()), StatusCode::NOT_FOUND)]
#[case(ClinicError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(ClinicError::SlotConflict("taken".to_string()), StatusCode::CONFLICT)]
#[case(ClinicError::Authentication("Missing token".to_string()), StatusCode::UNAUTHORIZED)]
#[case(ClinicError::Authorization("Not authorized".to_string()), StatusCode::FORBIDDEN)]
#[case(ClinicError::Database(eyre::eyre!("connection refused")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    ClinicError::Internal(Box::new(std::io::Error::other("boom"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: ClinicError, #[case] status: StatusCode) {
    let response = map_error(error);

    assert_eq!(response.status(), status);
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let response = map_error(ClinicError::Database(eyre::eyre!(
        "password authentication failed for user postgres"
    )));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
}

#[test]
fn test_token_round_trips_caller() {
    let mut caller = caller_with_role(Role::Doctor);
    caller.doctor_id = Some(uuid::Uuid::new_v4());

    let token = issue_token(JWT_SECRET, &caller, Duration::minutes(5)).unwrap();
    let verified = JwtAuth::new(JWT_SECRET).verify(&token).unwrap();

    assert_eq!(verified, caller);
}

#[test]
fn test_expired_token_is_rejected() {
    let caller = caller_with_role(Role::Patient);
    let token = issue_token(JWT_SECRET, &caller, Duration::hours(-2)).unwrap();

    let result = JwtAuth::new(JWT_SECRET).verify(&token);

    assert!(matches!(result, Err(ClinicError::Authentication(_))));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = JwtAuth::new(JWT_SECRET).verify("not-a-jwt");

    assert!(matches!(result, Err(ClinicError::Authentication(_))));
}
