//! Route configuration and setup

use crate::auth::{service_token_middleware, AuthState};
use crate::constants::{MAX_UPLOAD_SIZE_BYTES, MEDIA_ROUTE};
use crate::error::{error_details_middleware, ErrorPresentation};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let presentation = ErrorPresentation::from_config(&state.config);
    let auth_state = Arc::new(AuthState {
        service_api_key: state.config.service_api_key.clone(),
    });

    // Issuance and store-from-URL sit behind the service token.
    let protected_routes = Router::new()
        .route(
            &format!("{}/get_upload_url", MEDIA_ROUTE),
            get(handlers::upload_url::get_upload_url),
        )
        .route(
            &format!("{}/from_url", MEDIA_ROUTE),
            post(handlers::from_url::store_from_url),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            service_token_middleware,
        ));

    // The token itself authorizes retrieval and relay upload.
    let public_routes = Router::new().route(
        &format!("{}/{{token}}", MEDIA_ROUTE),
        get(handlers::media::get_media).put(handlers::media::upload_media),
    );

    public_routes
        .merge(protected_routes)
        .layer(axum::middleware::from_fn_with_state(
            presentation,
            error_details_middleware,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_SIZE_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
