use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::warn;
use std::sync::Arc;

use crate::api::models::{RecommendationItem, RecommendationResponse, TitlesResponse};
use super::{error_response, json_error, AppState, RecommendationParams};

pub async fn get_titles(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.service.titles() {
        Ok(titles) => Json(TitlesResponse {
            total: titles.len(),
            titles,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RecommendationParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let k = params.k.unwrap_or(state.config.model.k_default);

    // One snapshot for both the query and the catalog lookups
    let deployment = state.service.current();
    let neighbors = match deployment.recommend(&params.title, k) {
        Ok(neighbors) => neighbors,
        Err(e) => return error_response(&e),
    };

    let recommendations = neighbors
        .into_iter()
        .enumerate()
        .map(|(i, neighbor)| {
            let details = deployment.book_details(&neighbor.title).unwrap_or_else(|e| {
                warn!("Catalog lookup failed for '{}': {:?}", neighbor.title, e);
                None
            });
            RecommendationItem {
                rank: i + 1,
                author: details.as_ref().and_then(|d| d.author.clone()),
                image_url: details.and_then(|d| d.image_url),
                title: neighbor.title,
                distance: neighbor.distance,
            }
        })
        .collect();

    Json(RecommendationResponse {
        title: params.title,
        k,
        recommendations,
    })
    .into_response()
}
