//! Domain layer: entities and repository contracts.
//!
//! - [`entities`] - Short URL record, short code and QR option types
//! - [`repositories`] - Storage trait implemented by the infrastructure layer
//!
//! Nothing here depends on HTTP, SQL or Redis.

pub mod entities;
pub mod repositories;
