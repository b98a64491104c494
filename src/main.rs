use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use folio_api::api::routes::{build_app, AppState};
use folio_api::config::AppConfig;
use folio_api::content::Profile;
use folio_api::messages::MessageStore;
use folio_api::metrics;
use folio_api::spam::{SledStore, SpamGuard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // init tracing from env RUST_LOG or FOLIO_LOG
    let filter = std::env::var("FOLIO_LOG")
        .unwrap_or_else(|_| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env();
    info!(port = config.port, data_dir = %config.data_dir, "folio-api starting up");

    let db = sled::open(&config.data_dir)?;
    let guard = SpamGuard::new(Arc::new(SledStore::open(&db)?));
    let messages = Arc::new(MessageStore::open(&db)?);
    let profile = Arc::new(Profile::load(config.profile_path.as_deref()));

    // Background: periodic sweep of stale submission records.
    {
        let guard = guard.clone();
        let sweep_secs = config.sweep_interval_secs;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(sweep_secs)).await;
                let removed = guard.sweep(Utc::now().timestamp_millis());
                metrics::GUARD_RECORDS.set(guard.store().len() as i64);
                if removed > 0 {
                    info!(removed, "stale submission records swept");
                }
            }
        });
    }

    let state = AppState {
        guard,
        messages,
        profile,
    };

    // CORS: permissive in dev, explicit allowlist otherwise.
    let cors = if config.dev_mode {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if !config.cors_origins.is_empty() {
        use tower_http::cors::AllowOrigin;
        let list: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // no public CORS by default in prod
        CorsLayer::new().allow_methods(Any)
    };

    let max_body = std::env::var("FOLIO_MAX_BODY_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(64 * 1024);

    let app = build_app(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(listen = %addr, "folio-api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = db.flush();
    })
    .await?;

    Ok(())
}
