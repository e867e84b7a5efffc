//! Landing page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::state::AppState;

/// Template for the landing page.
///
/// Renders `templates/home.html` with the API endpoint list and an example
/// request against the configured base URL.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub base_url: String,
    pub version: &'static str,
}

/// Renders the landing page.
///
/// # Endpoint
///
/// `GET /`
pub async fn home_handler(State(state): State<AppState>) -> impl IntoResponse {
    HomeTemplate {
        base_url: state.shortener_service.base_url().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    }
}
