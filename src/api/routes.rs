//! API route configuration.

use crate::api::handlers::{create_url_handler, get_qr_handler, get_url_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Version 1 API routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST /urls`                   - Create a short URL with its QR code
/// - `GET  /urls/{short_code}`      - Look up a short URL
/// - `GET  /urls/{short_code}/qr`   - Render the QR code (`?level=&size=`)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(create_url_handler))
        .route("/urls/{short_code}", get(get_url_handler))
        .route("/urls/{short_code}/qr", get(get_qr_handler))
}
