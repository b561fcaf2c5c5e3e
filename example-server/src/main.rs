use anyhow::Context;
use axum::{routing::get, Router};
use clap::Parser;
use db_navigator::{DbNavigator, NavigatorConfig};
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod database;

/// Serve a SQLite file through db-navigator
#[derive(Debug, Parser)]
#[command(version, about)]
struct Arguments {
    /// SQLite database file to browse
    #[arg(long, env = "DB_NAVIGATOR_DATABASE", default_value = "data/example.db")]
    database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "DB_NAVIGATOR_LISTEN", default_value = "127.0.0.1:3000")]
    listen: String,

    /// URL prefix the navigator is mounted under
    #[arg(long, env = "DB_NAVIGATOR_PREFIX", default_value = "/db")]
    prefix: String,

    /// Shared password protecting the navigator
    #[arg(long, env = "DB_NAVIGATOR_PASSWORD")]
    password: Option<String>,

    /// Accept this token as a credential instead of a password (repeatable)
    #[arg(long = "accept-token", env = "DB_NAVIGATOR_TOKENS", value_delimiter = ',')]
    accepted_tokens: Vec<String>,

    /// Disable row deletion
    #[arg(long, env = "DB_NAVIGATOR_READ_ONLY")]
    read_only: bool,

    /// Create and fill a demo database at the database path first
    #[arg(long, env = "DB_NAVIGATOR_SEED")]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,db_navigator=debug,tower_http=debug")),
        )
        .init();

    let arguments = Arguments::parse();

    if arguments.seed {
        if let Some(parent) = arguments.database.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        database::seed(&arguments.database)
            .await
            .context("seeding demo database")?;
    }

    let mut config = NavigatorConfig::new(&arguments.database)
        .prefix(&arguments.prefix)
        .read_only(arguments.read_only);

    if let Some(password) = arguments.password {
        config = config.password(password);
    }

    if !arguments.accepted_tokens.is_empty() {
        if config.password.is_some() {
            tracing::warn!("Both a password and accepted tokens are set; only tokens are checked");
        }
        let tokens = arguments.accepted_tokens;
        config = config.login_check(move |credential| {
            credential.is_some_and(|credential| tokens.iter().any(|token| token == credential))
        });
    }

    let navigator = DbNavigator::open(config.clone())
        .await
        .with_context(|| format!("opening {}", arguments.database.display()))?;

    let app = Router::new()
        .route("/", get(root_handler))
        .merge(navigator.into_router())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&arguments.listen)
        .await
        .with_context(|| format!("binding {}", arguments.listen))?;

    tracing::info!(address = %arguments.listen, "Server running");
    tracing::info!(
        "Database navigator available at http://{}{}/",
        arguments.listen,
        config.prefix
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to the db-navigator example server"
}
