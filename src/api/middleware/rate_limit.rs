//! Rate limiting middleware using token bucket algorithm.

use crate::error::AppError;
use anyhow::{Context, Result};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use serde_json::json;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Creates a per-IP rate limiter keyed on the socket peer address.
///
/// `per_second` is the sustained request rate; `burst` is the bucket size.
/// Requests exceeding the limit receive `429 Too Many Requests` with a
/// `rate_limited` error body and a `Retry-After` header.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the peer address
/// is available.
///
/// # Errors
///
/// Returns an error if `per_second` or `burst` is zero.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/urls", post(create_url_handler))
///     .layer(rate_limit::layer(1, 50)?);
/// ```
pub fn layer(
    per_second: u64,
    burst: u32,
) -> Result<GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms(per_second)?)
            .burst_size(burst)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    Ok(GovernorLayer::new(governor_conf).error_handler(error_response))
}

/// Same as [`layer`], but reads the client IP from `X-Forwarded-For`,
/// `X-Real-IP` or `Forwarded` before falling back to the peer address.
///
/// Use only behind a trusted reverse proxy, since clients can set these
/// headers themselves.
///
/// # Errors
///
/// Returns an error if `per_second` or `burst` is zero.
pub fn proxy_layer(
    per_second: u64,
    burst: u32,
) -> Result<GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_millisecond(replenish_interval_ms(per_second)?)
            .burst_size(burst)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    Ok(GovernorLayer::new(governor_conf).error_handler(error_response))
}

/// Renders governor rejections in the application's error format.
fn error_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = AppError::RateLimited {
                retry_after_seconds: wait_time,
            }
            .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(wait_time));
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::internal("Unable to identify client", json!({})).into_response()
        }
        GovernorError::Other { code, msg, .. } => {
            tracing::warn!(status = %code, "Rate limiter rejected request: {:?}", msg);
            AppError::internal("Rate limiter failure", json!({})).into_response()
        }
    }
}

/// Milliseconds between token refills for a sustained rate of `per_second`.
fn replenish_interval_ms(per_second: u64) -> Result<u64> {
    anyhow::ensure!(per_second > 0, "Rate limit must be at least 1 request per second");
    Ok((1000 / per_second).max(1))
}
