//! # Appointment Handlers
//!
//! HTTP handlers for slot discovery, booking and the appointment lifecycle.
//! Each handler authenticates the caller, delegates to the matching
//! `carebook_core::services` function and wraps the result in a response
//! type from `carebook_core::models::appointment`.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use carebook_core::{
    models::appointment::{
        AppointmentResponse, AppointmentStatus, AvailableSlotsResponse, BookAppointmentRequest,
        BookAppointmentResponse, ListAppointmentsResponse, MessageResponse,
        UpdateAppointmentRequest, UpdateAppointmentResponse,
    },
    services::{appointments, booking, slots},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::Authenticated, error_handling::AppError},
};

/// Query parameters for the available-slots endpoint
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub doctor_id: Uuid,
    /// Calendar date, `YYYY-MM-DD`
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    pub status: Option<AppointmentStatus>,
}

/// Lists the bookable slot start instants of a doctor on a date
///
/// # Endpoint
///
/// ```text
/// GET /api/appointments/available-slots?doctor_id=<uuid>&date=2025-06-02
/// ```
///
/// Slots are returned in chronological order. A doctor with no active
/// availability on that weekday yields an empty list.
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    Authenticated(_caller): Authenticated,
    query: Result<Query<SlotsQuery>, QueryRejection>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let Query(query) = query?;

    let slots = slots::compute_available_slots(state.store.as_ref(), query.doctor_id, query.date).await?;

    Ok(Json(AvailableSlotsResponse { slots }))
}

/// Books an appointment
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments
/// ```
///
/// # Errors
///
/// * 400 - malformed body or empty time range
/// * 404 - unknown doctor or patient
/// * 409 - the slot is already booked
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<Json<BookAppointmentResponse>, AppError> {
    let Json(payload) = payload?;

    let appointment = booking::book_appointment(
        state.store.as_ref(),
        state.notifier.clone(),
        &caller,
        payload,
    )
    .await?;

    Ok(Json(BookAppointmentResponse {
        appointment,
        message: "Appointment booked successfully".to_string(),
    }))
}

pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    query: Result<Query<ListAppointmentsQuery>, QueryRejection>,
) -> Result<Json<ListAppointmentsResponse>, AppError> {
    let Query(query) = query?;

    let appointments =
        appointments::list_appointments(state.store.as_ref(), &caller, query.status).await?;

    Ok(Json(ListAppointmentsResponse { appointments }))
}

pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let appointment = appointments::get_appointment(state.store.as_ref(), &caller, id).await?;

    Ok(Json(AppointmentResponse { appointment }))
}

/// Changes the status and/or notes of an appointment
///
/// Cancelling frees the slot for new bookings.
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<Json<UpdateAppointmentResponse>, AppError> {
    let Json(payload) = payload?;

    let appointment = appointments::update_appointment(
        state.store.as_ref(),
        state.notifier.clone(),
        &caller,
        id,
        payload,
    )
    .await?;

    Ok(Json(UpdateAppointmentResponse {
        appointment,
        message: "Appointment updated successfully".to_string(),
    }))
}

pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    appointments::delete_appointment(state.store.as_ref(), &caller, id).await?;

    Ok(Json(MessageResponse {
        message: "Appointment deleted successfully".to_string(),
    }))
}
