//! Repository trait for short URL storage.

use crate::domain::entities::{NewShortUrl, ShortCode, ShortUrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage for short URL records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new record if its code is free.
    ///
    /// The uniqueness check and the write are one atomic operation: of two
    /// concurrent inserts with the same code exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if the code is already taken.
    /// Returns [`AppError::StoreUnavailable`] if the backend cannot be reached.
    async fn insert(&self, new_url: NewShortUrl) -> Result<ShortUrlRecord, AppError>;

    /// Finds a record by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on backend errors.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrlRecord>, AppError>;

    /// Returns `true` if the backend is reachable.
    async fn health_check(&self) -> bool;
}
