pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod polls;
pub mod sse;
pub mod startup;

use crate::startup::AppState;
use axum::{
    Router,
    extract::Extension,
    http::{
        StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

async fn index_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health(Extension(app_state): Extension<AppState>) -> impl IntoResponse {
    match app_state.store.health().await {
        Ok(status) => (StatusCode::OK, status),
        Err(e) => {
            error!("health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/poll", get(polls::list_polls).post(polls::create_poll))
        .route("/api/poll/events", get(sse::all_polls_sse))
        .route("/api/poll/:id", get(polls::get_poll))
        .route("/api/poll/:id/vote", post(polls::vote_on_poll))
        .route("/api/poll/:id/Vote", post(polls::vote_on_poll))
        .route("/api/poll/:id/results", get(polls::poll_results))
        .route("/api/poll/:id/events", get(sse::poll_updates_sse))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_credentials(true)
                .allow_methods([
                    axum::http::Method::POST,
                    axum::http::Method::GET,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([CONTENT_TYPE, ACCEPT]),
        )
        .fallback(handler_404)
}
