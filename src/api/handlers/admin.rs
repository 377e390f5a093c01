use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::api::models::StatusResponse;
use crate::services::training::TrainingService;
use super::{json_error, AppState};

/// Retrain in the background and swap the new model in when it is ready
pub async fn trigger_training(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.training.swap(true, Ordering::SeqCst) {
        return json_error(StatusCode::CONFLICT, "training already in progress".to_string());
    }

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        log::info!("Retraining triggered over the API");
        let config = task_state.config.clone();
        let result = tokio::task::spawn_blocking(move || TrainingService::new(config)?.deploy()).await;

        match result {
            Ok(Ok(deployment)) => {
                task_state.service.replace(deployment);
                log::info!("Retraining completed successfully");
            }
            Ok(Err(e)) => log::error!("Retraining failed: {:?}", e),
            Err(e) => log::error!("Retraining task panicked: {:?}", e),
        }
        task_state.training.store(false, Ordering::SeqCst);
    });

    let body = StatusResponse {
        status: "training started".to_string(),
    };
    (StatusCode::ACCEPTED, Json(body)).into_response()
}
