use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::api::security;
use crate::content::Profile;
use crate::messages::MessageStore;
use crate::metrics;
use crate::spam::guard::{DAILY_CAP, HOURLY_CAP};
use crate::spam::{identity, SpamGuard};

/// Shared handler state. Cheap to clone; everything inside is Arc-backed.
#[derive(Clone)]
pub struct AppState {
    pub guard: SpamGuard,
    pub messages: Arc<MessageStore>,
    pub profile: Arc<Profile>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api/profile", get(get_profile))
        .route("/api/contact", post(submit_contact))
        .route("/api/contact/status", get(contact_status))
        .route("/api/admin/messages", get(admin_messages))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

async fn get_profile(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.profile.as_ref().clone())
}

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn caller_identity(addr: &SocketAddr, headers: &HeaderMap) -> String {
    let ip = addr.ip().to_string();
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    identity::resolve(Some(&ip), ua)
}

/// Retry-After (whole seconds, rounded up) for a rejected submission.
fn retry_after_headers(time_until_reset_ms: i64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if time_until_reset_ms > 0 {
        let secs = (time_until_reset_ms + 999) / 1000;
        if let Ok(v) = HeaderValue::from_str(&secs.to_string()) {
            headers.insert(header::RETRY_AFTER, v);
        }
    }
    headers
}

async fn submit_contact(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<ContactRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            Json(json!({ "code": "invalid_request", "message": "name, email and message are required" })),
        );
    }

    let key = caller_identity(&addr, &headers);
    let now_ms = Utc::now().timestamp_millis();

    metrics::CONTACT_CHECKS.inc();
    let decision = state.guard.check(&key, now_ms);
    if !decision.allowed {
        metrics::CONTACT_REJECTED.inc();
        let status = state.guard.status(&key, now_ms);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            retry_after_headers(status.time_until_reset_ms),
            Json(json!({
                "code": "rate_limited",
                "message": decision.message,
            })),
        );
    }

    let saved = match state
        .messages
        .save(&req.name, &req.email, &req.message, &key)
    {
        Ok(msg) => msg,
        Err(err) => {
            tracing::error!(error = %err, "failed to store contact message");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                HeaderMap::new(),
                Json(json!({ "code": "storage_error", "message": "could not store message" })),
            );
        }
    };

    state.guard.record(&key, now_ms);
    metrics::CONTACT_ACCEPTED.inc();
    metrics::GUARD_RECORDS.set(state.guard.store().len() as i64);
    info!(id = %saved.id, "contact message accepted");

    (
        StatusCode::OK,
        HeaderMap::new(),
        Json(json!({ "ok": true, "id": saved.id })),
    )
}

async fn contact_status(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let key = caller_identity(&addr, &headers);
    let status = state.guard.status(&key, Utc::now().timestamp_millis());
    Json(json!({
        "daily_count": status.daily_count,
        "daily_cap": DAILY_CAP,
        "hourly_count": status.hourly_count,
        "hourly_cap": HOURLY_CAP,
        "time_until_reset_ms": status.time_until_reset_ms,
        "is_blocked": status.is_blocked,
    }))
}

async fn admin_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = headers.get("x-admin-token").and_then(|v| v.to_str().ok());
    if let Err((code, msg)) = security::require_admin(token) {
        return (code, Json(json!({ "code": "unauthorized", "message": msg })));
    }

    match state.messages.list() {
        Ok(all) => (
            StatusCode::OK,
            Json(json!({ "count": all.len(), "messages": all })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "failed to list contact messages");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "code": "storage_error", "message": "could not list messages" })),
            )
        }
    }
}
