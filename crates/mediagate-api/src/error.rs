//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts
//! into `AppError` (including `StorageError`) renders through the same path.
//!
//! Responses carry the redacted body. Outside production, `error_details_middleware`
//! replaces it with the detailed one.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use mediagate_core::{AppError, Config, ErrorMetadata, LogLevel};
use mediagate_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from mediagate-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Full error body (details included), kept on the response for [`error_details_middleware`].
#[derive(Clone)]
struct DetailedErrorBody(ErrorResponse);

/// How error bodies are presented, decided once from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPresentation {
    pub expose_details: bool,
}

impl ErrorPresentation {
    pub fn from_config(config: &Config) -> Self {
        ErrorPresentation {
            expose_details: !config.is_production(),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let redacted = ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        // Sensitive errors never carry details, whatever the environment.
        let detailed = (!app_error.is_sensitive()).then(|| ErrorResponse {
            details: Some(app_error.detailed_message()),
            error_type: Some(app_error.error_type().to_string()),
            ..redacted.clone()
        });

        let mut response = (status, Json(redacted)).into_response();
        if let Some(detailed) = detailed {
            response.extensions_mut().insert(DetailedErrorBody(detailed));
        }
        response
    }
}

/// Swap in the detailed error body outside production.
pub async fn error_details_middleware(
    State(presentation): State<ErrorPresentation>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(DetailedErrorBody(detailed)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };
    if !presentation.expose_details {
        return response;
    }

    match serde_json::to_vec(&detailed) {
        Ok(body) => {
            response.headers_mut().remove(header::CONTENT_LENGTH);
            *response.body_mut() = Body::from(body);
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize error details"),
    }
    response
}
