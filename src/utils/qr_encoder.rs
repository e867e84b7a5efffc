//! QR code rendering to PNG and `data:` URLs.
//!
//! Rendering is a pure function of `(content, level, size)`: the same inputs
//! always produce byte-identical PNG output, so a QR returned at creation time
//! matches one fetched later with the same parameters.

use base64::Engine as _;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use serde_json::json;
use std::io::Cursor;

use crate::domain::entities::{QrErrorCorrection, QrOptions};
use crate::error::AppError;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

impl From<QrErrorCorrection> for EcLevel {
    fn from(level: QrErrorCorrection) -> Self {
        match level {
            QrErrorCorrection::L => EcLevel::L,
            QrErrorCorrection::M => EcLevel::M,
            QrErrorCorrection::Q => EcLevel::Q,
            QrErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Renders QR symbols as square grayscale PNG images.
///
/// Level and size validation happens when [`QrOptions`] is built, so any
/// options reaching the encoder are already in range.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl QrEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Renders `content` as a PNG of exactly `size × size` pixels.
    ///
    /// The symbol (with its quiet zone) is drawn at the largest whole-pixel
    /// module scale that fits and centred on a white canvas. If even one pixel
    /// per module does not fit, it is downscaled with nearest-neighbour
    /// sampling.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidQrParams`] if `content` does not fit in a QR
    /// symbol at the requested level, or [`AppError::Internal`] if PNG
    /// encoding fails.
    pub fn encode(&self, content: &str, options: QrOptions) -> Result<Vec<u8>, AppError> {
        let code = QrCode::with_error_correction_level(content.as_bytes(), options.error_correction.into())
            .map_err(|e| {
                AppError::invalid_qr_params(
                    format!("Content cannot be encoded as a QR code: {e}"),
                    json!({ "qr_error_correction": options.error_correction, "length": content.len() }),
                )
            })?;

        let size = options.size.get();
        let symbol = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .max_dimensions(size, size)
            .build();

        let image = fit_to_canvas(symbol, size);

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| {
                tracing::error!("PNG encoding failed: {}", e);
                AppError::internal("Failed to encode QR image", json!({}))
            })?;

        Ok(png)
    }

    /// Renders `content` and wraps the PNG as an inline `data:` URL.
    ///
    /// # Errors
    ///
    /// See [`Self::encode`].
    pub fn encode_data_url(&self, content: &str, options: QrOptions) -> Result<String, AppError> {
        let png = self.encode(content, options)?;
        Ok(to_data_url(&png))
    }
}

/// Encodes PNG bytes as `data:image/png;base64,...`.
pub fn to_data_url(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    let mut data_url = String::with_capacity(DATA_URL_PREFIX.len() + encoded.len());
    data_url.push_str(DATA_URL_PREFIX);
    data_url.push_str(&encoded);
    data_url
}

fn fit_to_canvas(symbol: GrayImage, size: u32) -> GrayImage {
    if symbol.width() > size || symbol.height() > size {
        return imageops::resize(&symbol, size, size, FilterType::Nearest);
    }

    if symbol.width() == size && symbol.height() == size {
        return symbol;
    }

    let mut canvas = GrayImage::from_pixel(size, size, Luma([255u8]));
    let x = i64::from((size - symbol.width()) / 2);
    let y = i64::from((size - symbol.height()) / 2);
    imageops::overlay(&mut canvas, &symbol, x, y);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::QrSize;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn options(level: QrErrorCorrection, size: u32) -> QrOptions {
        QrOptions::new(level, QrSize::new(size).unwrap())
    }

    fn decode(png: &[u8]) -> GrayImage {
        image::load_from_memory_with_format(png, ImageFormat::Png)
            .unwrap()
            .to_luma8()
    }

    #[test]
    fn test_encode_produces_png() {
        let png = QrEncoder::new()
            .encode("https://example.com", QrOptions::default())
            .unwrap();

        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_encode_has_requested_dimensions() {
        let encoder = QrEncoder::new();

        for size in [QrSize::MIN, 256, 333, 512, QrSize::MAX] {
            let png = encoder
                .encode("http://localhost:8080/abc123", options(QrErrorCorrection::M, size))
                .unwrap();
            let image = decode(&png);

            assert_eq!(image.width(), size);
            assert_eq!(image.height(), size);
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = QrEncoder::new();
        let opts = options(QrErrorCorrection::H, 512);

        let first = encoder.encode("https://example.com/x", opts).unwrap();
        let second = encoder.encode("https://example.com/x", opts).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_levels_render_differently() {
        let encoder = QrEncoder::new();

        let low = encoder
            .encode("https://example.com", options(QrErrorCorrection::L, 256))
            .unwrap();
        let high = encoder
            .encode("https://example.com", options(QrErrorCorrection::H, 256))
            .unwrap();

        assert_ne!(low, high);
    }

    #[test]
    fn test_canvas_border_is_white() {
        let png = QrEncoder::new()
            .encode("https://example.com", options(QrErrorCorrection::M, 300))
            .unwrap();
        let image = decode(&png);

        assert_eq!(image.get_pixel(0, 0), &Luma([255u8]));
        assert_eq!(image.get_pixel(299, 299), &Luma([255u8]));
    }

    #[test]
    fn test_encode_data_url_prefix() {
        let data_url = QrEncoder::new()
            .encode_data_url("https://example.com", QrOptions::default())
            .unwrap();

        assert!(data_url.starts_with("data:image/png;base64,"));
        assert!(data_url.len() > DATA_URL_PREFIX.len());
    }

    #[test]
    fn test_oversized_content_is_rejected() {
        let content = format!("https://example.com/{}", "x".repeat(4000));

        let err = QrEncoder::new()
            .encode(&content, options(QrErrorCorrection::H, 256))
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidQrParams { .. }));
    }
}
