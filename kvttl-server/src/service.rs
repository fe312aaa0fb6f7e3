use crate::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use kvttl_core::Store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// The store as seen by the HTTP layer: text keys, text values.
pub type SharedStore = Store<String, String>;

/// Maximum allowed key length (1 KB)
const MAX_KEY_LENGTH: usize = 1024;

/// Maximum allowed value length (1 MB)
const MAX_VALUE_LENGTH: usize = 1024 * 1024;

/// Truncates a key for safe logging (prevents leaking sensitive key data)
fn truncate_key_for_log(key: &str) -> String {
    const MAX_LOG_LEN: usize = 16;
    if key.len() <= MAX_LOG_LEN {
        return key.to_string();
    }
    let end = (0..=MAX_LOG_LEN)
        .rev()
        .find(|&i| key.is_char_boundary(i))
        .unwrap_or(0);
    format!("{}...", &key[..end])
}

/// Validates that a key is within size limits
fn validate_key(key: &str) -> Result<(), ApiError> {
    if key.is_empty() {
        return Err(ApiError::BadRequest("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Validates that a value is within size limits
fn validate_value(value: &str) -> Result<(), ApiError> {
    if value.len() > MAX_VALUE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "value exceeds maximum length of {} bytes",
            MAX_VALUE_LENGTH
        )));
    }
    Ok(())
}

/// Parses a TTL given in (possibly fractional) seconds.
///
/// Anything that is not a finite, strictly positive number representable as
/// a `Duration` is rejected with `message`.
fn parse_ttl(text: &str, message: &str) -> Result<Duration, ApiError> {
    let bad_request = || ApiError::BadRequest(message.to_string());

    let seconds: f64 = text.trim().parse().map_err(|_| bad_request())?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(bad_request());
    }
    match Duration::try_from_secs_f64(seconds) {
        Ok(ttl) if !ttl.is_zero() => Ok(ttl),
        _ => Err(bad_request()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PutParams {
    pub ttl: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            msg: "ok".to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TtlResponse {
    pub key: String,
    /// Seconds until expiry, `0` when the entry has no TTL
    pub ttl_seconds: f64,
    pub has_ttl: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Builds the HTTP router over `store`.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/put/{key}/{value}", get(put))
        .route("/get/{key}", get(get_value))
        .route("/update/{key}/{value}", get(update))
        .route("/delete/{key}", get(delete))
        .route("/ttl/{key}/{seconds}", get(set_ttl))
        .route("/ttl/{key}", get(ttl_remaining))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn put(
    State(store): State<SharedStore>,
    Path((key, value)): Path<(String, String)>,
    Query(params): Query<PutParams>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    validate_key(&key)?;
    validate_value(&value)?;

    // An empty `ttl=` is the same as no TTL at all
    match params.ttl.filter(|ttl| !ttl.is_empty()) {
        Some(ttl) => {
            let ttl = parse_ttl(&ttl, "ttl must be a positive number of seconds")?;
            tracing::debug!("PUT {} (ttl: {:?})", truncate_key_for_log(&key), ttl);
            store.put_with_ttl(key, value, ttl)?;
        }
        None => {
            tracing::debug!("PUT {} (ttl: never)", truncate_key_for_log(&key));
            store.put(key, value)?;
        }
    }

    Ok((StatusCode::CREATED, MessageResponse::ok()))
}

async fn get_value(
    State(store): State<SharedStore>,
    Path(key): Path<String>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    validate_key(&key)?;
    tracing::debug!("GET {}", truncate_key_for_log(&key));

    let value = store.get(key.as_str())?;
    Ok(Json(HashMap::from([(key, value)])))
}

async fn update(
    State(store): State<SharedStore>,
    Path((key, value)): Path<(String, String)>,
) -> Result<Json<HashMap<String, String>>, ApiError> {
    validate_key(&key)?;
    validate_value(&value)?;
    tracing::debug!("UPDATE {}", truncate_key_for_log(&key));

    store.update(key.as_str(), value.as_str())?;
    Ok(Json(HashMap::from([(key, value)])))
}

async fn delete(
    State(store): State<SharedStore>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_key(&key)?;
    tracing::debug!("DELETE {}", truncate_key_for_log(&key));

    store.delete(key.as_str())?;
    Ok(MessageResponse::ok())
}

async fn set_ttl(
    State(store): State<SharedStore>,
    Path((key, seconds)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_key(&key)?;
    let ttl = parse_ttl(&seconds, "seconds must be a positive number")?;
    tracing::debug!("SET_TTL {} (ttl: {:?})", truncate_key_for_log(&key), ttl);

    store.set_ttl(key.as_str(), ttl)?;
    Ok(MessageResponse::ok())
}

async fn ttl_remaining(
    State(store): State<SharedStore>,
    Path(key): Path<String>,
) -> Result<Json<TtlResponse>, ApiError> {
    validate_key(&key)?;
    tracing::debug!("TTL {}", truncate_key_for_log(&key));

    let remaining = store.ttl_remaining(key.as_str())?;
    Ok(Json(TtlResponse {
        key,
        ttl_seconds: remaining.map(|d| d.as_secs_f64()).unwrap_or(0.0),
        has_ttl: remaining.is_some(),
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
