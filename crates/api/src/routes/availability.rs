use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/doctors/:doctor_id/availability",
            get(handlers::availability::list_availability)
                .post(handlers::availability::create_availability),
        )
        .route(
            "/api/availability/:id",
            patch(handlers::availability::update_availability)
                .delete(handlers::availability::delete_availability),
        )
}
