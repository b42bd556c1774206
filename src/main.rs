//! Aircraft archiver — binary entrypoint.
//! Starts the feed poller and the status/metrics HTTP server, and stops both
//! on Ctrl-C or SIGTERM.

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aircraft_archiver::{
    api, build_poller, metrics::Metrics, shutdown::ShutdownSignal, state, ArchiverConfig,
};

/// `RUST_LOG` controls the filter (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ArchiverConfig::load_default().context("loading archiver config")?;
    tracing::info!(
        hubs = ?cfg.hubs,
        root = %cfg.root_dir.display(),
        port = cfg.port,
        "archiver config loaded"
    );

    // Before any task starts, so SIGTERM during startup is handled too.
    let signals = ShutdownSignal::install()?;
    let metrics = Metrics::init()?;
    let status = state::shared_status();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut poller = build_poller(&cfg, status.clone());
    let poll_rx = shutdown_rx.clone();
    let poller_task = tokio::spawn(async move { poller.run(poll_rx).await });

    let app = api::router(api::AppState { status }).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .with_context(|| format!("binding port {}", cfg.port))?;
    tracing::info!(port = cfg.port, "http listening");

    let mut http_rx = shutdown_rx;
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = http_rx.changed().await;
    });
    let server_task = tokio::spawn(async move { server.await });

    signals.forward(shutdown_tx).await;

    if let Err(e) = poller_task.await {
        tracing::warn!(error = %e, "poller task ended abnormally");
    }
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "http server error"),
        Err(e) => tracing::warn!(error = %e, "http server task ended abnormally"),
    }
    Ok(())
}
