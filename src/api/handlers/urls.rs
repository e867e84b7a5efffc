//! Handlers for the `/api/v1/urls` endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::qr::{QrCodeResponse, QrQueryParams};
use crate::api::dto::short_url::{
    CreateShortUrlRequest, CreatedShortUrlResponse, ShortUrlResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL and renders its QR code.
///
/// # Endpoint
///
/// `POST /api/v1/urls`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/some/long/path",
///   "qr_error_correction": "H",  // optional, default "M"
///   "qr_size": 512               // optional, default 256
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "aZ3kP9",
///   "original_url": "https://example.com/some/long/path",
///   "short_url": "http://localhost:8080/aZ3kP9",
///   "qr_error_correction": "H",
///   "qr_size": 512,
///   "created_at": "2026-01-01T12:00:00Z",
///   "qr_data_url": "data:image/png;base64,iVBORw0KGgo..."
/// }
/// ```
///
/// # Errors
///
/// - 400 `invalid_url` / `invalid_qr_params` / `validation_error`
/// - 500 `code_space_exhausted`
/// - 503 `store_unavailable`
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateShortUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedShortUrlResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let created = state
        .shortener_service
        .create(
            &payload.original_url,
            payload.qr_error_correction.as_deref(),
            payload.qr_size,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Returns the stored record for a short code.
///
/// # Endpoint
///
/// `GET /api/v1/urls/{short_code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn get_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let service = &state.shortener_service;
    let record = service.resolve(&short_code).await?;
    let short_url = service.short_url(&record.short_code);

    Ok(Json(ShortUrlResponse::new(record, short_url)))
}

/// Renders the QR code for a short code.
///
/// # Endpoint
///
/// `GET /api/v1/urls/{short_code}/qr?level=H&size=512`
///
/// Both query parameters are optional and override the settings stored at
/// creation for this response only.
///
/// # Errors
///
/// - 400 `invalid_qr_params` for an unknown level or out-of-range size
/// - 404 `not_found` if the code is unknown
pub async fn get_qr_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    params: Result<Query<QrQueryParams>, QueryRejection>,
) -> Result<Json<QrCodeResponse>, AppError> {
    let Query(params) = params?;

    let qr = state
        .shortener_service
        .qr_code(&short_code, params.level.as_deref(), params.size)
        .await?;

    Ok(Json(qr.into()))
}
