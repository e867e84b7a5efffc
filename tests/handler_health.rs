mod common;

use async_trait::async_trait;
use qr_shortener::domain::entities::{NewShortUrl, ShortCode, ShortUrlRecord};
use qr_shortener::domain::repositories::UrlRepository;
use qr_shortener::error::AppError;
use qr_shortener::infrastructure::cache::{CacheError, CacheResult, CacheService, NullCache};
use qr_shortener::infrastructure::persistence::MemoryUrlRepository;
use qr_shortener::utils::code_generator::RandomCodeGenerator;
use serde_json::{Value, json};
use std::sync::Arc;

struct UnreachableStore;

#[async_trait]
impl UrlRepository for UnreachableStore {
    async fn insert(&self, _new_url: NewShortUrl) -> Result<ShortUrlRecord, AppError> {
        Err(AppError::store_unavailable("URL store is unavailable", json!({})))
    }

    async fn find_by_code(&self, _code: &ShortCode) -> Result<Option<ShortUrlRecord>, AppError> {
        Err(AppError::store_unavailable("URL store is unavailable", json!({})))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

struct UnreachableCache;

#[async_trait]
impl CacheService for UnreachableCache {
    async fn get_record(&self, _code: &ShortCode) -> CacheResult<Option<ShortUrlRecord>> {
        Err(CacheError::ConnectionError("refused".to_string()))
    }

    async fn set_record(&self, _record: &ShortUrlRecord, _ttl: Option<u64>) -> CacheResult<()> {
        Err(CacheError::ConnectionError("refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _repo) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let state = common::create_state_with(
        Arc::new(UnreachableStore),
        Arc::new(RandomCodeGenerator::default()),
        Arc::new(NullCache::new()),
    );
    let server = common::test_server(state);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "error");
}

#[tokio::test]
async fn test_store_failure_maps_to_503() {
    let state = common::create_state_with(
        Arc::new(UnreachableStore),
        Arc::new(RandomCodeGenerator::default()),
        Arc::new(NullCache::new()),
    );
    let server = common::test_server(state);

    let response = server
        .post("/api/v1/urls")
        .json(&json!({ "original_url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), 503);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "store_unavailable"
    );

    let response = server.get("/api/v1/urls/abc123").await;
    assert_eq!(response.status_code(), 503);
}

#[tokio::test]
async fn test_failing_cache_falls_back_to_store() {
    let state = common::create_state_with(
        Arc::new(MemoryUrlRepository::new()),
        Arc::new(RandomCodeGenerator::default()),
        Arc::new(UnreachableCache),
    );
    let server = common::test_server(state);

    let created = server
        .post("/api/v1/urls")
        .json(&json!({ "original_url": "https://example.com" }))
        .await
        .json::<Value>();
    let code = created["short_code"].as_str().unwrap();

    let response = server.get(&format!("/api/v1/urls/{}", code)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["original_url"], "https://example.com");

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), 503);
    assert_eq!(health.json::<Value>()["checks"]["cache"]["status"], "error");
}
