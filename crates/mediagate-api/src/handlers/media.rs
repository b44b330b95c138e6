//! Media token routes: retrieval and relay upload.
//!
//! Both routes are unauthenticated; the token proves the key and its expiry.

use crate::constants::SNIFF_LEN;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use mediagate_core::AppError;
use mediagate_storage::content_type::detect_content_type;
use mediagate_storage::FetchedObject;
use std::io::SeekFrom;
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Serve the object behind a media token.
///
/// Local objects are streamed as an attachment; cloud objects redirect to a
/// short-lived native URL.
#[tracing::instrument(skip(state, token), fields(operation = "get_media"))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Response, HttpAppError> {
    match state.gateway.resolve(&token, Utc::now()).await? {
        FetchedObject::LocalPath { path, filename } => stream_local_file(&path, &filename).await,
        FetchedObject::RedirectUrl { url, filename } => {
            tracing::debug!(filename = %filename, "Redirecting to native object URL");
            Ok(Redirect::temporary(&url).into_response())
        }
    }
}

/// Write the request body under the key sealed in the token.
#[tracing::instrument(skip(state, token, body), fields(operation = "upload_media", size_bytes = body.len()))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<StatusCode, HttpAppError> {
    state.gateway.accept_upload(&token, body, Utc::now()).await?;
    Ok(StatusCode::OK)
}

async fn stream_local_file(path: &FsPath, filename: &str) -> Result<Response, HttpAppError> {
    let mut file = File::open(path).await.map_err(|e| {
        tracing::error!(error = %e, path = %path.display(), "Failed to open stored file");
        AppError::NotFound(format!("Media not found: {}", filename))
    })?;
    let size = file.metadata().await.map_err(AppError::from)?.len();

    let mut head = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < head.len() {
        let n = file.read(&mut head[filled..]).await.map_err(AppError::from)?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    file.seek(SeekFrom::Start(0))
        .await
        .map_err(AppError::from)?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, detect_content_type(&head[..filled]))
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition(filename))
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}

/// `attachment` disposition with an ASCII fallback and the RFC 5987 UTF-8 form.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
