/// Tempmail API - Admin API Lambda
///
/// This module contains the REST handlers for the temporary mail admin
/// control plane. Authentication happens in front of this service.
pub mod api;
pub mod context;
pub mod error;
pub mod middleware;

pub use context::ApiContext;
pub use error::ApiError;

use axum::{
    Router,
    body::Body as AxumBody,
    extract::DefaultBodyLimit,
    http::{Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Build the admin router around a shared context
pub fn router(ctx: Arc<ApiContext>) -> Router {
    let admin = Router::new()
        // Addresses
        .route("/address", get(api::address::list))
        .route("/new_address", post(api::address::create))
        .route("/delete_address/{id}", delete(api::address::delete))
        .route("/show_password/{id}", get(api::address::show_password))
        // Mail collections
        .route("/mails", get(api::mails::list))
        .route("/mails_unknow", get(api::mails::unknown))
        .route("/sendbox", get(api::sendbox::list))
        // Send permissions
        .route(
            "/address_sender",
            get(api::sender::list).post(api::sender::update),
        )
        // Dashboard and settings
        .route("/statistics", get(api::statistics::get))
        .route(
            "/account_settings",
            get(api::settings::get).post(api::settings::save),
        );

    Router::new()
        .route("/health", get(api::health::handler))
        .nest("/admin", admin)
        .route_layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
        // Settings lists are the largest bodies this API accepts
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(ctx)
}

/// Main API handler - converts Lambda HTTP request to Axum router
pub async fn handler(ctx: Arc<ApiContext>, event: Request) -> Result<Response<Body>, LambdaError> {
    info!("Processing API request: {} {}", event.method(), event.uri().path());

    let app = router(ctx);

    // Convert Lambda HTTP request to Axum request
    let (parts, body) = event.into_parts();
    let axum_request = http::Request::from_parts(parts, AxumBody::from(body.to_vec()));

    // Router errors are Infallible
    let response = app
        .oneshot(axum_request)
        .await
        .unwrap_or_else(|never| match never {});

    // Convert Axum response body to Lambda response body
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(Response::from_parts(parts, Body::from(body_bytes.to_vec())))
}
