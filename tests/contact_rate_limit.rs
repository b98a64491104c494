use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use folio_api::api::routes::{build_app, AppState};
use folio_api::content::Profile;
use folio_api::messages::MessageStore;
use folio_api::spam::{SledStore, SpamGuard};

/// Boot the real router on an ephemeral port over a temp sled database.
async fn spawn_app(tmp: &TempDir) -> String {
    let db = sled::open(tmp.path()).expect("open sled");
    let guard = SpamGuard::new(Arc::new(SledStore::open(&db).expect("spam tree")));
    let messages = Arc::new(MessageStore::open(&db).expect("messages tree"));
    let state = AppState {
        guard,
        messages,
        profile: Arc::new(Profile::default()),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_app(state);
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("serve");
    });
    format!("http://{}", addr)
}

fn contact_body(i: u64) -> serde_json::Value {
    json!({
        "name": "Visitor",
        "email": "visitor@example.com",
        "message": format!("hello number {}", i),
    })
}

#[tokio::test]
async fn hourly_cap_rejects_fourth_submission() {
    let tmp = TempDir::new().expect("tmpdir");
    let base = spawn_app(&tmp).await;
    let client = reqwest::Client::new();

    // First three submissions within the hour are accepted.
    for i in 0..3u64 {
        let r = client
            .post(format!("{}/api/contact", &base))
            .json(&contact_body(i))
            .send()
            .await
            .expect("contact request");
        assert_eq!(r.status(), reqwest::StatusCode::OK, "submission {} rejected", i);
        let j: serde_json::Value = r.json().await.expect("json");
        assert_eq!(j["ok"], true);
    }

    // The fourth hits the hourly cap.
    let r = client
        .post(format!("{}/api/contact", &base))
        .json(&contact_body(3))
        .send()
        .await
        .expect("contact request");
    assert_eq!(r.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    assert!(
        r.headers().get(reqwest::header::RETRY_AFTER).is_some(),
        "rejection should carry Retry-After"
    );
    let j: serde_json::Value = r.json().await.expect("json");
    assert_eq!(j["code"], "rate_limited");
    let msg = j["message"].as_str().expect("message");
    assert!(msg.contains('3'), "message should name the hourly cap: {msg}");

    // Status endpoint reflects the used quota.
    let r = client
        .get(format!("{}/api/contact/status", &base))
        .send()
        .await
        .expect("status request");
    assert_eq!(r.status(), reqwest::StatusCode::OK);
    let s: serde_json::Value = r.json().await.expect("json");
    assert_eq!(s["daily_count"], 3);
    assert_eq!(s["hourly_count"], 3);
    assert_eq!(s["daily_cap"], 5);
    assert_eq!(s["hourly_cap"], 3);
    assert_eq!(s["is_blocked"], false);
    assert!(s["time_until_reset_ms"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn status_is_empty_before_any_submission() {
    let tmp = TempDir::new().expect("tmpdir");
    let base = spawn_app(&tmp).await;

    let s: serde_json::Value = reqwest::get(format!("{}/api/contact/status", &base))
        .await
        .expect("status request")
        .json()
        .await
        .expect("json");
    assert_eq!(s["daily_count"], 0);
    assert_eq!(s["hourly_count"], 0);
    assert_eq!(s["is_blocked"], false);
    assert_eq!(s["time_until_reset_ms"], 0);
}

#[tokio::test]
async fn blank_fields_are_rejected() {
    let tmp = TempDir::new().expect("tmpdir");
    let base = spawn_app(&tmp).await;

    let r = reqwest::Client::new()
        .post(format!("{}/api/contact", &base))
        .json(&json!({ "name": "", "email": "a@b.c", "message": "hi" }))
        .send()
        .await
        .expect("contact request");
    assert_eq!(r.status(), reqwest::StatusCode::BAD_REQUEST);
    let j: serde_json::Value = r.json().await.expect("json");
    assert_eq!(j["code"], "invalid_request");
}

#[tokio::test]
async fn profile_and_health_endpoints_respond() {
    let tmp = TempDir::new().expect("tmpdir");
    let base = spawn_app(&tmp).await;

    let h: serde_json::Value = reqwest::get(format!("{}/health", &base))
        .await
        .expect("health")
        .json()
        .await
        .expect("json");
    assert_eq!(h["ok"], true);

    let p: serde_json::Value = reqwest::get(format!("{}/api/profile", &base))
        .await
        .expect("profile")
        .json()
        .await
        .expect("json");
    assert_eq!(p["name"], "Portfolio Owner");
}

#[tokio::test]
async fn admin_inbox_requires_token() {
    let tmp = TempDir::new().expect("tmpdir");
    let base = spawn_app(&tmp).await;
    let client = reqwest::Client::new();

    std::env::set_var("FOLIO_ADMIN_TOKEN", "inbox-test-token");

    let r = client
        .post(format!("{}/api/contact", &base))
        .json(&contact_body(0))
        .send()
        .await
        .expect("contact request");
    assert_eq!(r.status(), reqwest::StatusCode::OK);

    // No token: rejected.
    let r = client
        .get(format!("{}/api/admin/messages", &base))
        .send()
        .await
        .expect("admin request");
    assert_eq!(r.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Valid token: the stored message is listed.
    let r = client
        .get(format!("{}/api/admin/messages", &base))
        .header("x-admin-token", "inbox-test-token")
        .send()
        .await
        .expect("admin request");
    assert_eq!(r.status(), reqwest::StatusCode::OK);
    let j: serde_json::Value = r.json().await.expect("json");
    assert_eq!(j["count"], 1);
    assert_eq!(j["messages"][0]["name"], "Visitor");
}

#[tokio::test]
async fn metrics_expose_contact_counters() {
    let tmp = TempDir::new().expect("tmpdir");
    let base = spawn_app(&tmp).await;
    let client = reqwest::Client::new();

    let r = client
        .post(format!("{}/api/contact", &base))
        .json(&contact_body(0))
        .send()
        .await
        .expect("contact request");
    assert_eq!(r.status(), reqwest::StatusCode::OK);

    let text = reqwest::get(format!("{}/metrics", &base))
        .await
        .expect("metrics")
        .text()
        .await
        .expect("text");
    assert!(text.contains("folio_contact_checks_total"));
    assert!(text.contains("folio_contact_accepted_total"));
}
