use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::api::models::ErrorResponse;
use crate::config::AppConfig;
use crate::errors::RecommenderError;
use crate::services::recommendation::RecommendationService;

pub mod admin;
pub mod books;

pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub config: AppConfig,
    pub training: AtomicBool,
}

impl AppState {
    pub fn new(service: Arc<RecommendationService>, config: AppConfig) -> Self {
        Self {
            service,
            config,
            training: AtomicBool::new(false),
        }
    }
}

#[derive(Deserialize)]
pub struct RecommendationParams {
    pub title: String,
    pub k: Option<usize>,
}

pub fn error_response(err: &RecommenderError) -> Response {
    let status = match err {
        RecommenderError::UnknownTitle(_) => StatusCode::NOT_FOUND,
        RecommenderError::NotBuilt | RecommenderError::EmptyMatrix => StatusCode::CONFLICT,
        RecommenderError::InvalidK => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_fatal() {
        log::error!("Request failed: {}", err);
    } else {
        log::debug!("Request rejected: {}", err);
    }
    json_error(status, err.to_string())
}

pub fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}
