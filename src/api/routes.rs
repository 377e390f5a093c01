use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use crate::api::handlers::{admin::trigger_training, books::{get_recommendations, get_titles}, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/titles", get(get_titles))
        .route("/api/recommendations", get(get_recommendations))
        .route("/api/train", post(trigger_training))
        .with_state(state)
}
