pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/positions", get(handlers::handle_list_positions))
        .route("/api/v1/candidates", post(handlers::handle_submit_candidate))
        .route("/api/v1/sessions/:id", get(handlers::handle_session_status))
        .route("/api/v1/sessions/:id/chat", post(handlers::handle_chat))
        .with_state(state)
}
