//! Short URL creation, resolution and QR rendering.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{NewShortUrl, QrOptions, ShortCode, ShortUrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::qr_encoder::QrEncoder;
use crate::utils::url_validator::validate_url;

/// Default number of generate-and-insert attempts per create.
pub const DEFAULT_MAX_CODE_ATTEMPTS: usize = 5;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    /// Public prefix for short URLs, e.g. `https://s.example.com`.
    pub base_url: String,
    /// Bound on generate-and-insert attempts before giving up.
    pub max_code_attempts: usize,
    /// TTL for cached records; `None` uses the cache's default.
    pub cache_ttl_seconds: Option<u64>,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            cache_ttl_seconds: None,
        }
    }
}

/// Result of a successful create.
#[derive(Debug, Clone)]
pub struct CreatedShortUrl {
    pub record: ShortUrlRecord,
    pub short_url: String,
    pub qr_data_url: String,
}

/// A QR code rendered for a stored short URL.
#[derive(Debug, Clone)]
pub struct RenderedQr {
    pub short_code: ShortCode,
    pub short_url: String,
    pub qr_data_url: String,
    pub options: QrOptions,
}

/// Service that creates and resolves short URLs.
///
/// Owns the code generation retry loop: a candidate code is only accepted once
/// the store's atomic insert succeeds, and a [`AppError::DuplicateCode`] from
/// the store is never returned to callers.
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn CodeGenerator>,
    cache: Arc<dyn CacheService>,
    encoder: QrEncoder,
    base_url: String,
    max_code_attempts: usize,
    cache_ttl_seconds: Option<u64>,
}

impl ShortenerService {
    /// Creates a new shortener service.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        generator: Arc<dyn CodeGenerator>,
        cache: Arc<dyn CacheService>,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            repository,
            generator,
            cache,
            encoder: QrEncoder::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_code_attempts: settings.max_code_attempts.max(1),
            cache_ttl_seconds: settings.cache_ttl_seconds,
        }
    }

    /// Shortens `original_url`.
    ///
    /// The URL and QR parameters are validated before the store is touched, so
    /// a rejected request leaves no record behind. QR options default to level
    /// `M` and 256 px and are stored with the record.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the URL is not an absolute HTTP(S) URL
    /// - [`AppError::InvalidQrParams`] if the level or size is out of range
    /// - [`AppError::CodeSpaceExhausted`] if every attempt collided
    /// - [`AppError::StoreUnavailable`] if the store failed
    pub async fn create(
        &self,
        original_url: &str,
        qr_error_correction: Option<&str>,
        qr_size: Option<u32>,
    ) -> Result<CreatedShortUrl, AppError> {
        let original_url = validate_url(original_url).map_err(|e| {
            AppError::invalid_url("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let qr_options = QrOptions::resolve(qr_error_correction, qr_size, QrOptions::default())?;

        let record = self.insert_with_unique_code(original_url, qr_options).await?;
        let short_url = self.short_url(&record.short_code);
        let qr_data_url = self.render_qr(short_url.clone(), qr_options).await?;

        metrics::counter!("shortener_urls_created_total").increment(1);
        info!(short_code = %record.short_code, "Created short URL");

        Ok(CreatedShortUrl {
            record,
            short_url,
            qr_data_url,
        })
    }

    /// Looks up the record stored under `code`.
    ///
    /// Consults the cache first and populates it on a store hit. Codes that
    /// could never have been generated are reported as not found without a
    /// store round trip.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record exists
    /// - [`AppError::StoreUnavailable`] if the store failed
    pub async fn resolve(&self, code: &str) -> Result<ShortUrlRecord, AppError> {
        let Ok(short_code) = ShortCode::parse(code) else {
            return Err(not_found(code));
        };

        match self.cache.get_record(&short_code).await {
            Ok(Some(record)) => return Ok(record),
            Ok(None) => {}
            Err(e) => warn!("Cache lookup failed for {}: {}", short_code, e),
        }

        let record = self
            .repository
            .find_by_code(&short_code)
            .await?
            .ok_or_else(|| not_found(code))?;

        if let Err(e) = self.cache.set_record(&record, self.cache_ttl_seconds).await {
            warn!("Failed to cache {}: {}", short_code, e);
        }

        Ok(record)
    }

    /// Renders the QR code for a stored short URL.
    ///
    /// `level` and `size` override the record's stored settings for this call
    /// only; the record itself is never modified.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record exists
    /// - [`AppError::InvalidQrParams`] if an override is out of range
    /// - [`AppError::StoreUnavailable`] if the store failed
    pub async fn qr_code(
        &self,
        code: &str,
        level: Option<&str>,
        size: Option<u32>,
    ) -> Result<RenderedQr, AppError> {
        let record = self.resolve(code).await?;
        let options = QrOptions::resolve(level, size, record.qr_options())?;

        let short_url = self.short_url(&record.short_code);
        let qr_data_url = self.render_qr(short_url.clone(), options).await?;

        Ok(RenderedQr {
            short_code: record.short_code,
            short_url,
            qr_data_url,
            options,
        })
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &ShortCode) -> String {
        format!("{}/{}", self.base_url, code)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if the backing store is reachable.
    pub async fn check_store(&self) -> bool {
        self.repository.health_check().await
    }

    async fn insert_with_unique_code(
        &self,
        original_url: &str,
        qr_options: QrOptions,
    ) -> Result<ShortUrlRecord, AppError> {
        for attempt in 1..=self.max_code_attempts {
            let new_url = NewShortUrl {
                short_code: self.generator.generate(),
                original_url: original_url.to_string(),
                qr_options,
            };

            match self.repository.insert(new_url).await {
                Ok(record) => return Ok(record),
                Err(AppError::DuplicateCode { code }) => {
                    metrics::counter!("shortener_code_collisions_total").increment(1);
                    warn!(attempt, "Short code collision on {}", code);
                }
                Err(e) => return Err(e),
            }
        }

        metrics::counter!("shortener_code_space_exhausted_total").increment(1);
        error!(
            attempts = self.max_code_attempts,
            "Short code space exhausted: every generated code collided"
        );

        Err(AppError::CodeSpaceExhausted {
            attempts: self.max_code_attempts,
        })
    }

    async fn render_qr(&self, content: String, options: QrOptions) -> Result<String, AppError> {
        let encoder = self.encoder;
        debug!(level = %options.error_correction, size = %options.size, "Rendering QR code");

        tokio::task::spawn_blocking(move || encoder.encode_data_url(&content, options))
            .await
            .map_err(|e| {
                error!("QR rendering task failed: {}", e);
                AppError::internal("Failed to render QR code", json!({}))
            })?
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": code }))
}
