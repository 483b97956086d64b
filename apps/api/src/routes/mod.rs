pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::talent::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/employees", get(handlers::handle_list_employees))
        .route("/api/v1/talent-match", post(handlers::handle_talent_match))
        .with_state(state)
}
