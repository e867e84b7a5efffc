//! In-process implementation of the URL repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::domain::entities::{NewShortUrl, ShortCode, ShortUrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// URL repository backed by a sharded concurrent map.
///
/// Inserts go through [`DashMap::entry`], which holds the shard lock across the
/// vacancy check and the write. Reads on other shards proceed in parallel.
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    records: DashMap<ShortCode, ShortUrlRecord>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn insert(&self, new_url: NewShortUrl) -> Result<ShortUrlRecord, AppError> {
        match self.records.entry(new_url.short_code.clone()) {
            Entry::Occupied(existing) => {
                debug!("Code {} already taken", existing.key());
                Err(AppError::DuplicateCode {
                    code: existing.key().to_string(),
                })
            }
            Entry::Vacant(slot) => {
                let record = ShortUrlRecord::new(new_url, Utc::now());
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrlRecord>, AppError> {
        Ok(self.records.get(code).map(|entry| entry.value().clone()))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
