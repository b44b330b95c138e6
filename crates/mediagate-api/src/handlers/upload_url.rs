//! Upload-URL issuance.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use mediagate_core::{AppError, ResponseType, UploadUrls};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct UploadUrlQuery {
    pub identifier: String,
    #[serde(default)]
    pub response_type: ResponseType,
    pub file_name: Option<String>,
}

/// Reserve an object key and return where to PUT the bytes and where to read them back.
#[tracing::instrument(
    skip(state, query),
    fields(
        identifier = %query.identifier,
        response_type = %query.response_type,
        operation = "get_upload_url"
    )
)]
pub async fn get_upload_url(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadUrlQuery>,
) -> Result<Json<UploadUrls>, HttpAppError> {
    let identifier = query.identifier.trim();
    if identifier.is_empty() {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "identifier parameter is required".to_string(),
        )));
    }

    let urls = state
        .driver()
        .presigned_upload(
            identifier,
            query.response_type,
            query.file_name.as_deref().map(str::trim),
        )
        .await?;

    Ok(Json(urls))
}
