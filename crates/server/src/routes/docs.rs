use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::debug;

use store::Document;

use super::AppState;
use crate::errors::ApiError;
use crate::observability::record_op;

/// 文档总数
pub async fn count(State(state): State<AppState>) -> Json<usize> {
    record_op("count");
    Json(state.store.count())
}

/// 所有 key（无序）
pub async fn keys(State(state): State<AppState>) -> Json<Vec<String>> {
    record_op("keys");
    Json(state.store.keys())
}

/// 所有 key -> 文档
pub async fn get_all(State(state): State<AppState>) -> Json<HashMap<String, Arc<Document>>> {
    record_op("items");
    Json(state.store.items())
}

/// Missing keys answer `null` with 200, not 404.
pub async fn get_doc(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<Option<Arc<Document>>> {
    record_op("get");
    Json(state.store.get(&key))
}

/// Body is parsed regardless of Content-Type.
pub async fn put_doc(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let doc: Document = serde_json::from_slice(&body)?;
    record_op("set");
    debug!(%key, "document stored");
    state.store.set(key, doc);
    Ok(StatusCode::NO_CONTENT)
}

/// Batch insert/replace. The whole body is validated before any key is
/// written.
pub async fn put_many(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let docs = match serde_json::from_slice::<Value>(&body)? {
        Value::Object(map) => map,
        Value::Array(_) => return Err(ApiError::NotAnObject("an array")),
        Value::String(_) => return Err(ApiError::NotAnObject("a string")),
        Value::Number(_) => return Err(ApiError::NotAnObject("a number")),
        Value::Bool(_) => return Err(ApiError::NotAnObject("a boolean")),
        Value::Null => return Err(ApiError::NotAnObject("null")),
    };
    if docs.keys().any(|k| k.is_empty()) {
        return Err(ApiError::EmptyKey);
    }
    record_op("batch_set");
    debug!(documents = docs.len(), "batch stored");
    state.store.set_many(docs);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_doc(State(state): State<AppState>, Path(key): Path<String>) -> StatusCode {
    record_op("remove");
    let existed = state.store.remove(&key);
    debug!(%key, existed, "document removed");
    StatusCode::NO_CONTENT
}
