//! Warden API server binary.
//!
//! Loads configuration from the environment (and `.env.*` files), connects to
//! PostgreSQL, runs migrations and serves the auth API.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use warden_api::config::ApiConfig;
use warden_core::store::PgStore;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "warden_server", about = "Warden authentication API server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL. Overrides `DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

/// Load `.env.production` when `ENV=production`, `.env.development` otherwise,
/// then fall back to a plain `.env`. Variables already set win.
fn load_dotenv() {
    let env = std::env::var("ENV").unwrap_or_else(|_| "development".into());
    let file = if env == "production" {
        ".env.production"
    } else {
        ".env.development"
    };
    if let Err(e) = dotenvy::from_filename(file)
        && !e.not_found()
    {
        eprintln!("failed to load {file}: {e}");
    }
    dotenvy::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,warden_api=debug,warden_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.pg_connection_url = url;
    }

    info!(
        version = warden_core::version(),
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        algorithm = ?config.auth.algorithm(),
        token_lifetime_minutes = config.auth.token_lifetime_minutes(),
        "starting warden_server"
    );
    if config.cors_origins.is_empty() {
        warn!("CORS_ORIGIN not set; cross-origin requests will not be allowed");
    }

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    info!("running database migrations");
    warden_core::migrate::migrate(&pool).await?;

    let state = warden_api::AppState::new(Arc::new(PgStore::new(pool)), &config.auth);
    let app = warden_api::router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
