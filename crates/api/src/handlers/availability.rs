//! # Availability Handlers
//!
//! Handlers for a doctor's recurring weekly availability windows. Listing is
//! open to any authenticated caller; changes are reserved to the doctor who
//! owns the windows and to admins.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use carebook_core::{
    models::{
        appointment::MessageResponse,
        availability::{
            AvailabilityResponse, CreateAvailabilityRequest, ListAvailabilityResponse,
            UpdateAvailabilityRequest,
        },
    },
    services::availability,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::Authenticated, error_handling::AppError},
};

/// Lists a doctor's windows ordered by weekday, then start time
///
/// # Endpoint
///
/// ```text
/// GET /api/doctors/:doctor_id/availability
/// ```
pub async fn list_availability(
    State(state): State<Arc<ApiState>>,
    Authenticated(_caller): Authenticated,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<ListAvailabilityResponse>, AppError> {
    let availabilities = availability::list_windows(state.store.as_ref(), doctor_id).await?;

    Ok(Json(ListAvailabilityResponse { availabilities }))
}

/// Creates a window for a doctor
///
/// # Endpoint
///
/// ```text
/// POST /api/doctors/:doctor_id/availability
/// ```
///
/// # Errors
///
/// * 400 - start not before end, or slot duration outside 5-120 minutes
/// * 403 - caller is not the owning doctor or an admin
/// * 404 - unknown doctor
pub async fn create_availability(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    Path(doctor_id): Path<Uuid>,
    payload: Result<Json<CreateAvailabilityRequest>, JsonRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Json(payload) = payload?;

    let window =
        availability::create_window(state.store.as_ref(), &caller, doctor_id, payload).await?;

    Ok(Json(AvailabilityResponse {
        availability: window,
        message: "Availability created successfully".to_string(),
    }))
}

pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateAvailabilityRequest>, JsonRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Json(payload) = payload?;

    let window =
        availability::set_window_active(state.store.as_ref(), &caller, id, payload.is_active)
            .await?;

    Ok(Json(AvailabilityResponse {
        availability: window,
        message: "Availability updated successfully".to_string(),
    }))
}

pub async fn delete_availability(
    State(state): State<Arc<ApiState>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    availability::delete_window(state.store.as_ref(), &caller, id).await?;

    Ok(Json(MessageResponse {
        message: "Availability deleted successfully".to_string(),
    }))
}
