use axum::http::{StatusCode, header::AUTHORIZATION};
use carebook_core::models::{
    appointment::{
        AppointmentStatus, AvailableSlotsResponse, BookAppointmentResponse,
        ListAppointmentsResponse, UpdateAppointmentResponse,
    },
    auth::Role,
    availability::DayOfWeek,
};
use axum_test::{TestRequest, TestServer};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, admin_caller, bearer, caller_with_role, monday};

fn slots_request(server: &TestServer, ctx: &TestContext) -> TestRequest {
    server
        .get("/api/appointments/available-slots")
        .add_query_param("doctor_id", ctx.doctor.id)
        .add_query_param("date", monday())
}

#[tokio::test]
async fn test_available_slots_lists_free_instants() {
    let ctx = TestContext::new().await;
    ctx.open_window(DayOfWeek::Monday, "09:00", "12:00", 30).await;
    let server = ctx.server();

    let response = slots_request(&server, &ctx)
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .await;

    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(
        body,
        json!({
            "slots": [
                "2025-06-02T09:00:00",
                "2025-06-02T09:30:00",
                "2025-06-02T10:00:00",
                "2025-06-02T10:30:00",
                "2025-06-02T11:00:00",
                "2025-06-02T11:30:00"
            ]
        })
    );
}

#[tokio::test]
async fn test_available_slots_requires_a_token() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = slots_request(&server, &ctx).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Authentication error: Missing authorization header"
    );
}

#[tokio::test]
async fn test_forged_token_is_rejected() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let token = carebook_api::middleware::auth::issue_token(
        "some-other-secret",
        &ctx.patient_caller(),
        chrono::Duration::hours(1),
    )
    .unwrap();

    let response = slots_request(&server, &ctx)
        .add_header(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_available_slots_rejects_bad_date() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .get("/api/appointments/available-slots")
        .add_query_param("doctor_id", ctx.doctor.id)
        .add_query_param("date", "02-06-2025")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(
        error.starts_with("Validation error: Invalid query parameters"),
        "unexpected error: {}",
        error
    );
}

#[tokio::test]
async fn test_book_then_conflict() {
    let ctx = TestContext::new().await;
    ctx.open_window(DayOfWeek::Monday, "09:00", "12:00", 30).await;
    let server = ctx.server();
    let body = json!({
        "doctor_id": ctx.doctor.id,
        "appointment_date": "2025-06-02",
        "start_time": "09:00",
        "end_time": "09:30",
        "reason": "Annual checkup"
    });

    let booked = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&body)
        .await;
    booked.assert_status(StatusCode::OK);
    let booked = booked.json::<BookAppointmentResponse>();
    assert_eq!(booked.appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(booked.appointment.patient_id, ctx.patient.id);
    assert_eq!(booked.message, "Appointment booked successfully");

    let conflict = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&body)
        .await;
    conflict.assert_status(StatusCode::CONFLICT);
    let error = conflict.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("This time slot is already booked"));

    let slots = slots_request(&server, &ctx)
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .await
        .json::<AvailableSlotsResponse>();
    assert_eq!(slots.slots.len(), 5);
}

#[tokio::test]
async fn test_book_with_malformed_time_is_bad_request() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&json!({
            "doctor_id": ctx.doctor.id,
            "appointment_date": "2025-06-02",
            "start_time": "9am",
            "end_time": "09:30"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_doctor_cannot_book() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.doctor_caller()))
        .json(&ctx.booking("09:00", "09:30"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_over_http_reopens_slot() {
    let ctx = TestContext::new().await;
    ctx.open_window(DayOfWeek::Monday, "09:00", "10:00", 30).await;
    let server = ctx.server();

    let booked = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&ctx.booking("09:00", "09:30"))
        .await
        .json::<BookAppointmentResponse>();

    let cancelled = server
        .patch(&format!("/api/appointments/{}", booked.appointment.id))
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&json!({ "status": "CANCELLED" }))
        .await;
    cancelled.assert_status(StatusCode::OK);
    assert_eq!(
        cancelled.json::<UpdateAppointmentResponse>().appointment.status,
        AppointmentStatus::Cancelled
    );

    let slots = slots_request(&server, &ctx)
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .await
        .json::<AvailableSlotsResponse>();
    assert_eq!(slots.slots.len(), 2);
}

#[tokio::test]
async fn test_list_and_fetch_appointments() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let booked = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&ctx.booking("09:00", "09:30"))
        .await
        .json::<BookAppointmentResponse>();

    let listed = server
        .get("/api/appointments")
        .add_query_param("status", "SCHEDULED")
        .add_header(AUTHORIZATION, bearer(&ctx.doctor_caller()))
        .await
        .json::<ListAppointmentsResponse>();
    assert_eq!(listed.appointments, vec![booked.appointment.clone()]);

    let fetched = server
        .get(&format!("/api/appointments/{}", booked.appointment.id))
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .await;
    fetched.assert_status(StatusCode::OK);
    assert_eq!(fetched.json::<Value>()["appointment"]["start_time"], "09:00");

    let pharmacy = server
        .get("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&caller_with_role(Role::Pharmacy)))
        .await;
    pharmacy.assert_status(StatusCode::FORBIDDEN);

    let missing = server
        .get(&format!("/api/appointments/{}", uuid::Uuid::new_v4()))
        .add_header(AUTHORIZATION, bearer(&admin_caller()))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_admin_only() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let booked = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .json(&ctx.booking("09:00", "09:30"))
        .await
        .json::<BookAppointmentResponse>();
    let path = format!("/api/appointments/{}", booked.appointment.id);

    server
        .delete(&path)
        .add_header(AUTHORIZATION, bearer(&ctx.patient_caller()))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let deleted = server
        .delete(&path)
        .add_header(AUTHORIZATION, bearer(&admin_caller()))
        .await;
    deleted.assert_status(StatusCode::OK);
    assert_eq!(
        deleted.json::<Value>()["message"],
        "Appointment deleted successfully"
    );
}
