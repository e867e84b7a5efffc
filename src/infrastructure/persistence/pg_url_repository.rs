//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, QrSize, ShortCode, ShortUrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Raw `short_urls` row.
#[derive(Debug, FromRow)]
struct ShortUrlRow {
    short_code: String,
    original_url: String,
    qr_error_correction: String,
    qr_size: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ShortUrlRow> for ShortUrlRecord {
    type Error = AppError;

    fn try_from(row: ShortUrlRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str| {
            tracing::error!("Corrupt {} in short_urls row {}", field, row.short_code);
            AppError::internal("Stored record is invalid", json!({}))
        };

        let qr_error_correction = row
            .qr_error_correction
            .parse()
            .map_err(|_| corrupt("qr_error_correction"))?;
        let qr_size = u32::try_from(row.qr_size)
            .ok()
            .and_then(|size| QrSize::new(size).ok())
            .ok_or_else(|| corrupt("qr_size"))?;

        Ok(ShortUrlRecord {
            short_code: ShortCode::new_unchecked(row.short_code),
            original_url: row.original_url,
            qr_error_correction,
            qr_size,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL repository for short URL storage.
///
/// The `short_code` primary key enforces uniqueness; inserts use
/// `ON CONFLICT DO NOTHING` so a taken code is reported as an empty result
/// rather than a failed statement.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert(&self, new_url: NewShortUrl) -> Result<ShortUrlRecord, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            INSERT INTO short_urls (short_code, original_url, qr_error_correction, qr_size)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (short_code) DO NOTHING
            RETURNING short_code, original_url, qr_error_correction, qr_size, created_at
            "#,
        )
        .bind(new_url.short_code.as_str())
        .bind(&new_url.original_url)
        .bind(new_url.qr_options.error_correction.as_str())
        .bind(new_url.qr_options.size.get() as i32)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::DuplicateCode {
                code: new_url.short_code.into_inner(),
            }),
        }
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrlRecord>, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            SELECT short_code, original_url, qr_error_correction, qr_size, created_at
            FROM short_urls
            WHERE short_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrlRecord::try_from).transpose()
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
