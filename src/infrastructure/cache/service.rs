//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

use crate::domain::entities::{ShortCode, ShortUrlRecord};

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache for short URL records.
///
/// Records never change after creation, so entries only leave the cache by
/// TTL. Implementations are fail-open: backend errors are logged and reported
/// as misses so lookups fall back to the store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached record for `code`, or `None` on miss.
    async fn get_record(&self, code: &ShortCode) -> CacheResult<Option<ShortUrlRecord>>;

    /// Stores `record` with an optional TTL in seconds (implementation default
    /// if `None`).
    async fn set_record(&self, record: &ShortUrlRecord, ttl_seconds: Option<u64>)
    -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
