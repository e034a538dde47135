//! HTTP handlers for the JSON interface
//!
//! Each handler maps one request to exactly one engine call and wraps the
//! outcome in the `{ "message": ..., "data": ... }` envelope. Engine error
//! kinds are surfaced as HTTP status codes without changing their meaning.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::store::{StoreEngine, StoreError};

/// Shared application state
pub type AppState = Arc<StoreEngine>;

/// JSON response envelope
#[derive(Debug, Serialize)]
pub struct ResponseMsg {
    /// "success" or the error message
    pub message: String,

    /// Operation result, omitted on errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Query parameters for the expire route
#[derive(Debug, Deserialize)]
pub struct ExpireParams {
    /// TTL in seconds
    pub ttl: u64,
}

fn success(data: serde_json::Value) -> (StatusCode, Json<ResponseMsg>) {
    (
        StatusCode::OK,
        Json(ResponseMsg {
            message: "success".to_string(),
            data: Some(data),
        }),
    )
}

fn failure(err: StoreError) -> (StatusCode, Json<ResponseMsg>) {
    (
        status_for(&err),
        Json(ResponseMsg {
            message: err.to_string(),
            data: None,
        }),
    )
}

/// Map an engine error kind to an HTTP status code
fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::KeyNotFound
        | StoreError::ValueNotFound
        | StoreError::NoExpirySet
        | StoreError::FileNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Expired => StatusCode::GONE,
        StoreError::InvalidCount | StoreError::MalformedSnapshot(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /get/{key}
pub async fn get_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match engine.get(&key) {
        Ok(values) => success(json!({ "key": key, "values": values })),
        Err(e) => failure(e),
    }
}

/// GET /getuq/{key}
pub async fn get_unique_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match engine.get_unique(&key) {
        Ok(values) => success(json!({ "key": key, "values": values })),
        Err(e) => failure(e),
    }
}

/// GET /getkey/{value}
pub async fn get_key_handler(
    State(engine): State<AppState>,
    Path(value): Path<String>,
) -> impl IntoResponse {
    match engine.keys_for_value(&value) {
        Ok(keys) => success(json!({ "value": value, "keys": keys })),
        Err(e) => failure(e),
    }
}

/// POST /set/{key} with a JSON array of values as the body
pub async fn set_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
    Json(values): Json<Vec<String>>,
) -> impl IntoResponse {
    debug!("HTTP set {} ({} values)", key, values.len());
    engine.set(&key, values);
    success(json!("OK"))
}

/// POST /setuq/{key} with a JSON array of values as the body
pub async fn set_unique_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
    Json(values): Json<Vec<String>>,
) -> impl IntoResponse {
    debug!("HTTP setuq {} ({} values)", key, values.len());
    engine.set_unique(&key, values);
    success(json!("OK"))
}

/// DELETE /delete/{key}
pub async fn delete_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match engine.delete(&key) {
        Ok(()) => success(json!("Deleted")),
        Err(e) => failure(e),
    }
}

/// GET /exists/{key}
pub async fn exists_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    success(json!({ "key": key, "exists": engine.exists(&key) }))
}

/// GET /ttl/{key}
pub async fn ttl_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match engine.ttl(&key) {
        Ok(remaining) => success(json!({ "key": key, "ttl_seconds": remaining.as_secs() })),
        Err(e) => failure(e),
    }
}

/// POST /expire/{key}?ttl=SECONDS
pub async fn expire_handler(
    State(engine): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<ExpireParams>,
) -> impl IntoResponse {
    match engine.expire(&key, std::time::Duration::from_secs(params.ttl)) {
        Ok(()) => success(json!("OK")),
        Err(e) => failure(e),
    }
}

/// GET /help
pub async fn help_handler() -> impl IntoResponse {
    success(json!([
        "GET /get/{key}",
        "GET /getuq/{key}",
        "GET /getkey/{value}",
        "POST /set/{key}          body: JSON array of values",
        "POST /setuq/{key}        body: JSON array of values",
        "DELETE /delete/{key}",
        "GET /exists/{key}",
        "GET /ttl/{key}",
        "POST /expire/{key}?ttl=SECONDS",
        "GET /help",
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&StoreError::KeyNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&StoreError::ValueNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&StoreError::NoExpirySet), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&StoreError::Expired), StatusCode::GONE);
        assert_eq!(status_for(&StoreError::InvalidCount), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&StoreError::Io("disk full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ResponseMsg {
            message: "success".to_string(),
            data: Some(json!({ "key": "k" })),
        })
        .unwrap();
        assert_eq!(body["message"], "success");
        assert_eq!(body["data"]["key"], "k");

        let body = serde_json::to_value(ResponseMsg {
            message: "key not found".to_string(),
            data: None,
        })
        .unwrap();
        assert!(body.get("data").is_none());
    }
}
