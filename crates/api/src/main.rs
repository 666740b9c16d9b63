use std::sync::Arc;
use std::time::Duration;

use libris_api::app::services::AppServices;
use libris_api::sweeper::OverdueSweeper;
use libris_circulation::DEFAULT_DAILY_RATE_CENTS;
use libris_core::SystemClock;
use libris_store::MemoryStore;

#[tokio::main]
async fn main() {
    libris_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let sweep_interval_secs = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);

    let daily_rate_cents = std::env::var("DAILY_FINE_RATE_CENTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_DAILY_RATE_CENTS);

    let services = Arc::new(AppServices::new(
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
        daily_rate_cents,
    ));

    let sweeper = OverdueSweeper {
        interval: Duration::from_secs(sweep_interval_secs),
    };
    let _sweeper_handle = sweeper.spawn("overdue-sweeper", services.clone());

    let app = libris_api::app::build_app(jwt_secret, services);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
