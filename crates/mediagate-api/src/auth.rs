//! Service token guard for the issuance and store endpoints.
//!
//! Callers present `Authorization: Bearer <SERVICE_API_KEY>`. When no key is
//! configured the guarded routes are open.

use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mediagate_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AuthState {
    pub service_api_key: Option<String>,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn service_token_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth_state.service_api_key.as_deref() else {
        return next.run(request).await;
    };

    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    if !secure_compare(token.trim(), expected) {
        tracing::warn!("Rejected request with invalid service token");
        return HttpAppError(AppError::Unauthorized("Invalid service token".to_string()))
            .into_response();
    }

    next.run(request).await
}
