//! Grid connect match server using the async actor model.
//!
//! Each loaded match is owned by a MatchActor managed by the MatchManager;
//! matches are stored in PostgreSQL, or in memory when no database is
//! configured.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use gc_server::{
    api::{self, middleware::JwtKeys},
    config::ServerConfig,
    logging,
};
use grid_connect::{
    MatchManager,
    db::{Database, InMemoryMatchRepository, MatchRepository, PgMatchRepository},
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a grid connect match server

USAGE:
  gc_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL, else in-memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT verification secret, at least 32 characters
  DB_MAX_CONNECTIONS       Pool size limits and timeouts (DB_MIN_CONNECTIONS,
                           DB_CONNECTION_TIMEOUT_SECS, DB_IDLE_TIMEOUT_SECS,
                           DB_MAX_LIFETIME_SECS)
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    info!("Starting grid connect server at {}", config.bind);

    let (repository, database): (Arc<dyn MatchRepository>, Option<Database>) =
        match &config.database {
            Some(db_config) => {
                let db = Database::new(db_config)
                    .await
                    .context("Failed to connect to database")?;
                db.migrate().await.context("Failed to apply schema")?;
                info!("Database connected successfully");
                (Arc::new(PgMatchRepository::new(db.pool().clone())), Some(db))
            }
            None => {
                log::warn!("DATABASE_URL not set, matches are kept in memory only");
                (Arc::new(InMemoryMatchRepository::new()), None)
            }
        };

    let manager = Arc::new(MatchManager::new(repository));

    let state = api::AppState {
        manager,
        jwt: Arc::new(JwtKeys::new(&config.security.jwt_secret)),
        database: database.clone(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
