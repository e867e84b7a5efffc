//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`               - Landing page
//! - `GET  /health`         - Health check: store and cache
//! - `GET  /{short_code}`   - Short URL redirect
//! - `/api/v1/*`            - REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Configured origins for browser frontends
//! - **Timeout** - `408 Request Timeout` after `REQUEST_TIMEOUT_SECONDS`
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Path normalization** - Trailing slash handling
//!
//! Failures raised by the middleware itself (rate limit, timeout, unknown
//! route) use the same JSON error body as the handlers.

use crate::api;
use crate::api::handlers::{health_handler, home_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::config::{Config, RateLimitConfig};
use crate::error::AppError;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use std::time::Duration;
use tower::Layer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::timeout::TimeoutLayer;

/// Constructs the application router with all routes and middleware,
/// wrapped in trailing-slash normalization.
///
/// # Errors
///
/// Returns an error if rate limit or CORS settings are invalid.
pub fn app_router(state: AppState, config: &Config) -> Result<NormalizePath<Router>> {
    let router = router(state, config)?;
    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}

/// Builds the routes and middleware stack without path normalization.
///
/// When rate limiting is enabled the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// Returns an error if rate limit or CORS settings are invalid.
pub fn router(state: AppState, config: &Config) -> Result<Router> {
    let mut api_router = api::routes::routes();
    let mut redirect_router = Router::new().route("/{short_code}", get(redirect_handler));

    if config.rate_limit.enabled {
        (api_router, redirect_router) =
            apply_rate_limits(api_router, redirect_router, &config.rate_limit, config.behind_proxy)?;
    }

    let router = Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .merge(redirect_router)
        .nest("/api/v1", api_router)
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_seconds),
        ))
        .layer(map_response(timeout_error_body))
        .layer(cors_layer(&config.cors_allowed_origins)?)
        .layer(tracing::layer());

    Ok(router)
}

/// Applies the API bucket to `/api/v1` and the looser redirect bucket to
/// `/{short_code}`. The key extractor type differs by deployment, hence the
/// two branches.
fn apply_rate_limits(
    api_router: Router<AppState>,
    redirect_router: Router<AppState>,
    limits: &RateLimitConfig,
    behind_proxy: bool,
) -> Result<(Router<AppState>, Router<AppState>)> {
    if behind_proxy {
        Ok((
            api_router.layer(rate_limit::proxy_layer(limits.per_second, limits.burst)?),
            redirect_router.layer(rate_limit::proxy_layer(
                limits.redirect_per_second,
                limits.redirect_burst,
            )?),
        ))
    } else {
        Ok((
            api_router.layer(rate_limit::layer(limits.per_second, limits.burst)?),
            redirect_router.layer(rate_limit::layer(
                limits.redirect_per_second,
                limits.redirect_burst,
            )?),
        ))
    }
}

async fn fallback_handler(uri: Uri) -> AppError {
    AppError::not_found("Route not found", json!({ "path": uri.path() }))
}

/// The timeout layer answers with a bare 408; give it the error body.
async fn timeout_error_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return AppError::RequestTimeout.into_response();
    }
    response
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}
