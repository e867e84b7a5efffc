//! DTOs for the QR code endpoint.

use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};

use crate::application::services::RenderedQr;
use crate::domain::entities::QrErrorCorrection;

/// Query parameters for `GET /api/v1/urls/{short_code}/qr`.
///
/// Empty values (`?size=`) are treated as absent so the stored setting applies.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct QrQueryParams {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub level: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct QrCodeResponse {
    pub short_code: String,
    pub short_url: String,
    pub qr_data_url: String,
    pub qr_error_correction: QrErrorCorrection,
    pub qr_size: u32,
}

impl From<RenderedQr> for QrCodeResponse {
    fn from(qr: RenderedQr) -> Self {
        Self {
            short_code: qr.short_code.into_inner(),
            short_url: qr.short_url,
            qr_data_url: qr.qr_data_url,
            qr_error_correction: qr.options.error_correction,
            qr_size: qr.options.size.get(),
        }
    }
}
