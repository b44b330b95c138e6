//! Store a remote file under a fresh key.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use mediagate_core::{AppError, ResponseType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StoreFromUrlRequest {
    pub url: String,
    pub identifier: String,
    #[serde(default)]
    pub response_type: ResponseType,
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreFromUrlResponse {
    pub download_url: String,
}

#[tracing::instrument(skip(state, payload), fields(operation = "store_from_url"))]
pub async fn store_from_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StoreFromUrlRequest>, JsonRejection>,
) -> Result<Json<StoreFromUrlResponse>, HttpAppError> {
    let Json(request) = payload?;

    let url = request.url.trim();
    let parsed_url = reqwest::Url::parse(url)
        .map_err(|_| AppError::InvalidInput(format!("Invalid URL format: {}", url)))?;
    if !matches!(parsed_url.scheme(), "http" | "https") || parsed_url.host_str().is_none() {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Only http(s) URLs with a host are supported: {}",
            url
        ))));
    }
    let identifier = request.identifier.trim();
    if identifier.is_empty() {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "identifier is required".to_string(),
        )));
    }

    let token = state
        .driver()
        .store_from_remote_url(
            parsed_url.as_str(),
            identifier,
            request.response_type,
            request.file_name.as_deref().map(str::trim),
        )
        .await?;

    Ok(Json(StoreFromUrlResponse {
        download_url: state.codec().media_url(&token),
    }))
}
