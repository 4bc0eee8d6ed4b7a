use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use store::DocumentStore;

use crate::observability::{encode_metrics, DOCUMENTS};

pub mod docs;

/// Shared handler state. Cloned per request; the store itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
}

pub async fn status() -> &'static str {
    "OK"
}

pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    DOCUMENTS.set(state.store.count() as i64);
    encode_metrics()
}

/// Build the full application router around an existing store.
pub fn build_router(store: Arc<DocumentStore>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/version", get(version))
        .route("/metrics", get(metrics))
        .route("/count", get(docs::count))
        .route("/keys", get(docs::keys))
        .route("/doc", get(docs::get_all).put(docs::put_many))
        .route(
            "/doc/:key",
            get(docs::get_doc).put(docs::put_doc).delete(docs::delete_doc),
        )
        .with_state(AppState { store })
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时记录状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
