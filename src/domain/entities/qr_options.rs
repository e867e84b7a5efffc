//! QR rendering parameters and their validation.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Standard QR error-correction tier.
///
/// Recoverable data loss: L ≈ 7%, M ≈ 15%, Q ≈ 25%, H ≈ 30%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QrErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl QrErrorCorrection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

impl fmt::Display for QrErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a level name. Surrounding whitespace and case are ignored.
impl FromStr for QrErrorCorrection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            _ => Err(AppError::invalid_qr_params(
                format!("Invalid QR error correction level {s:?} (use L, M, Q, or H)"),
                json!({ "qr_error_correction": s }),
            )),
        }
    }
}

/// Edge length of the rendered QR image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QrSize(u32);

impl QrSize {
    pub const MIN: u32 = 128;
    pub const MAX: u32 = 1024;
    pub const DEFAULT: QrSize = QrSize(256);

    /// # Errors
    ///
    /// Returns [`AppError::InvalidQrParams`] when `pixels` is outside
    /// `MIN..=MAX`. Out-of-range values are never clamped.
    pub fn new(pixels: u32) -> Result<Self, AppError> {
        if (Self::MIN..=Self::MAX).contains(&pixels) {
            Ok(Self(pixels))
        } else {
            Err(AppError::invalid_qr_params(
                format!(
                    "Invalid QR size {pixels} (use {}-{})",
                    Self::MIN,
                    Self::MAX
                ),
                json!({ "qr_size": pixels }),
            ))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for QrSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for QrSize {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QrSize> for u32 {
    fn from(size: QrSize) -> Self {
        size.0
    }
}

impl fmt::Display for QrSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated pair of QR parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QrOptions {
    pub error_correction: QrErrorCorrection,
    pub size: QrSize,
}

impl QrOptions {
    pub fn new(error_correction: QrErrorCorrection, size: QrSize) -> Self {
        Self {
            error_correction,
            size,
        }
    }

    /// Applies optional raw overrides on top of `base`.
    ///
    /// A missing or blank level keeps `base.error_correction`; a missing size
    /// keeps `base.size`. Anything supplied must be valid.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidQrParams`] for an unknown level or a size
    /// outside the supported range.
    pub fn resolve(level: Option<&str>, size: Option<u32>, base: QrOptions) -> Result<Self, AppError> {
        let error_correction = match level.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse()?,
            _ => base.error_correction,
        };

        let size = match size {
            Some(pixels) => QrSize::new(pixels)?,
            None => base.size,
        };

        Ok(Self {
            error_correction,
            size,
        })
    }
}
