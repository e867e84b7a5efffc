//! Application layer services implementing business logic.
//!
//! Services orchestrate code generation, storage, caching and QR rendering
//! behind a small API consumed by the HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Create, resolve and QR rendering
pub mod services;
