//! doormap-server - REST service for building/door map aggregates
//!
//! Records buildings located by GPS coordinate, each owning an ordered list
//! of doors with a language/congregation classification. Serves the CRUD
//! surface consumed by the map front ends and the doormap-client library.

use anyhow::Result;
use clap::Parser;
use doormap_common::config::{database_path, resolve_root_folder};
use doormap_common::db::init_database;
use doormap_server::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "doormap-server", version, about)]
struct Args {
    /// Root folder holding doormap.db (falls back to DOORMAP_ROOT, then the
    /// config file, then the platform data directory)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP listen port
    #[arg(long, env = "DOORMAP_PORT", default_value_t = 5730)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification before any database delays
    info!(
        "Starting doormap-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "DOORMAP_ROOT")?;
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    info!("✓ Database ready");

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("doormap-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
