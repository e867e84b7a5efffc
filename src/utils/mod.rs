//! Utility functions for code generation, URL validation and QR rendering.
//!
//! - [`code_generator`] - Random base62 short code generation
//! - [`url_validator`] - Absolute HTTP(S) URL validation
//! - [`qr_encoder`] - Deterministic QR PNG / data URL rendering

pub mod code_generator;
pub mod qr_encoder;
pub mod url_validator;
