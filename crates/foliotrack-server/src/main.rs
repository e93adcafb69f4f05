use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use foliotrack_core::config::Config;
use foliotrack_duckdb::DuckDbBackend;
use foliotrack_server::{app::build_app, state::AppState};

/// `foliotrack health`: liveness probe for container health checks.
///
/// Calls `GET http://localhost:$FOLIOTRACK_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("FOLIOTRACK_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{port}/health");
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("foliotrack_server=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db = DuckDbBackend::open(&cfg.db_path(), &cfg.duckdb_memory_limit)?;

    match db.count_visits().await {
        Ok(rows) => info!(rows, db_path = %cfg.db_path(), "Visit log opened"),
        Err(e) => tracing::warn!(error = %e, "Failed to count visit log rows"),
    }

    if cfg.admin_token.is_none() {
        tracing::warn!(
            "FOLIOTRACK_ADMIN_TOKEN is not set. Admin routes reject every request."
        );
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let port = cfg.port;
    let state = Arc::new(AppState::new(db, cfg));
    let app = build_app(state);

    info!(port, "Foliotrack listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
