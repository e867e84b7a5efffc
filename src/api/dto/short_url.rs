//! DTOs for the short URL endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::CreatedShortUrl;
use crate::domain::entities::{QrErrorCorrection, ShortUrlRecord};

/// Request body for `POST /api/v1/urls`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShortUrlRequest {
    /// The URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,

    /// `L`, `M`, `Q` or `H`, case-insensitive. Defaults to `M`.
    #[serde(default)]
    pub qr_error_correction: Option<String>,

    /// Edge length of the QR image in pixels. Defaults to 256. The range is
    /// checked by [`QrSize`](crate::domain::entities::QrSize).
    #[serde(default)]
    pub qr_size: Option<u32>,
}

/// A stored short URL as returned by lookups.
#[derive(Debug, Serialize)]
pub struct ShortUrlResponse {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub qr_error_correction: QrErrorCorrection,
    pub qr_size: u32,
    pub created_at: DateTime<Utc>,
}

impl ShortUrlResponse {
    pub fn new(record: ShortUrlRecord, short_url: String) -> Self {
        Self {
            short_code: record.short_code.into_inner(),
            original_url: record.original_url,
            short_url,
            qr_error_correction: record.qr_error_correction,
            qr_size: record.qr_size.get(),
            created_at: record.created_at,
        }
    }
}

/// Response for `POST /api/v1/urls`: the stored record plus its rendered QR.
#[derive(Debug, Serialize)]
pub struct CreatedShortUrlResponse {
    #[serde(flatten)]
    pub short_url: ShortUrlResponse,
    pub qr_data_url: String,
}

impl From<CreatedShortUrl> for CreatedShortUrlResponse {
    fn from(created: CreatedShortUrl) -> Self {
        Self {
            short_url: ShortUrlResponse::new(created.record, created.short_url),
            qr_data_url: created.qr_data_url,
        }
    }
}
