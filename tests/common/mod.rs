#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use qr_shortener::application::services::{ShortenerService, ShortenerSettings};
use qr_shortener::config::{Config, RateLimitConfig};
use qr_shortener::domain::entities::ShortCode;
use qr_shortener::domain::repositories::UrlRepository;
use qr_shortener::infrastructure::cache::{CacheService, NullCache};
use qr_shortener::infrastructure::persistence::MemoryUrlRepository;
use qr_shortener::routes::router;
use qr_shortener::state::AppState;
use qr_shortener::utils::code_generator::{CodeGenerator, RandomCodeGenerator};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::Layer;

pub const BASE_URL: &str = "http://localhost:8080";

/// Yields the scripted codes in order, then falls back to random codes.
pub struct ScriptedCodeGenerator {
    codes: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    fallback: RandomCodeGenerator,
}

impl ScriptedCodeGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            repeat: None,
            fallback: RandomCodeGenerator::default(),
        }
    }

    /// Always yields `code`.
    pub fn repeating(code: &str) -> Self {
        Self {
            codes: Mutex::new(VecDeque::new()),
            repeat: Some(code.to_string()),
            fallback: RandomCodeGenerator::default(),
        }
    }
}

impl CodeGenerator for ScriptedCodeGenerator {
    fn generate(&self) -> ShortCode {
        if let Some(code) = &self.repeat {
            return ShortCode::new_unchecked(code.clone());
        }

        match self.codes.lock().unwrap().pop_front() {
            Some(code) => ShortCode::new_unchecked(code),
            None => self.fallback.generate(),
        }
    }
}

/// Default configuration with rate limiting off, so tests need no peer address.
pub fn test_config() -> Config {
    Config {
        rate_limit: RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        },
        ..Config::default()
    }
}

pub fn create_service(
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn CodeGenerator>,
    cache: Arc<dyn CacheService>,
) -> Arc<ShortenerService> {
    Arc::new(ShortenerService::new(
        repository,
        generator,
        cache,
        ShortenerSettings {
            base_url: BASE_URL.to_string(),
            ..ShortenerSettings::default()
        },
    ))
}

pub fn create_state_with(
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn CodeGenerator>,
    cache: Arc<dyn CacheService>,
) -> AppState {
    AppState::new(create_service(repository, generator, cache.clone()), cache)
}

/// In-memory store, random codes, no cache. The store is returned for
/// inspection.
pub fn create_test_state() -> (AppState, Arc<MemoryUrlRepository>) {
    let repository = Arc::new(MemoryUrlRepository::new());
    let state = create_state_with(
        repository.clone(),
        Arc::new(RandomCodeGenerator::default()),
        Arc::new(NullCache::new()),
    );
    (state, repository)
}

pub fn test_server(state: AppState) -> TestServer {
    test_server_with_config(state, &test_config())
}

pub fn test_server_with_config(state: AppState, config: &Config) -> TestServer {
    let app = router(state, config).unwrap().layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

/// Inserts a fixed peer address, standing in for
/// `into_make_service_with_connect_info` in tests.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
