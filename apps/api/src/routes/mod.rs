pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Settings
        .route(
            "/api/v1/settings/scoring-weights",
            get(handlers::handle_get_weights).put(handlers::handle_set_weights),
        )
        // Screening
        .route(
            "/api/v1/jobs/:job_id/screenings",
            post(handlers::handle_start_screening),
        )
        .route(
            "/api/v1/jobs/:job_id/screening",
            get(handlers::handle_get_screening).delete(handlers::handle_remove_screening),
        )
        .route(
            "/api/v1/jobs/:job_id/screening/cancel",
            post(handlers::handle_cancel_screening),
        )
        .with_state(state)
}
