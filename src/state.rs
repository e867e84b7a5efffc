//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::infrastructure::cache::CacheService;

/// State shared by all request handlers.
///
/// Cloned per request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub shortener_service: Arc<ShortenerService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(shortener_service: Arc<ShortenerService>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            shortener_service,
            cache,
        }
    }
}
