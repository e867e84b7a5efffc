//! Core domain entities.
//!
//! - [`ShortUrlRecord`] - A stored short URL and its QR defaults
//! - [`NewShortUrl`] - Input for inserting a record
//! - [`ShortCode`] - Validated base62 identifier
//! - [`QrOptions`] - Validated QR error-correction level and image size

pub mod qr_options;
pub mod short_code;
pub mod short_url;

pub use qr_options::{QrErrorCorrection, QrOptions, QrSize};
pub use short_code::ShortCode;
pub use short_url::{NewShortUrl, ShortUrlRecord};
