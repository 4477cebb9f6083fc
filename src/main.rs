#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use clap::Parser;
use clap::Subcommand;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::admin::AdminSite;
use crate::database::Database;
use crate::database::DatabaseConfig;
use crate::media::MediaStorage;
use crate::settings::Settings;
use crate::users::ensure_initial_user;
use crate::utils::env_var_or_else;
use crate::views::JwtKeys;

mod admin;
mod commands;
mod contacts;
mod database;
mod forms;
mod graceful_shutdown;
mod images;
mod media;
mod models;
mod notes;
mod password;
mod requests;
mod settings;
#[cfg(test)]
mod tests;
mod users;
mod utils;
mod views;

const DEFAULT_RUST_LOG: &str = "cardfile=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";

/// A personal contact card, with a log of every request made to it
#[derive(Debug, Parser)]
#[command(name = "cardfile", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,

    /// Print every model with its number of rows
    #[command(name = "showmodels")]
    ShowModels,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::ShowModels => {
            let database = Database::from_config(DatabaseConfig::DetectConfig).await;

            commands::show_models(&database, &mut std::io::stdout(), &mut std::io::stderr())
                .await
        }
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let app = setup_app(DatabaseConfig::DetectConfig, settings).await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = TcpListener::bind(address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection
/// - Initial user setup
pub async fn setup_app(database_config: DatabaseConfig, settings: Settings) -> Result<Router> {
    let database = Database::from_config(database_config).await;

    ensure_initial_user(&database).await?;

    Ok(create_router(database, settings))
}

/// Create the router for the card
fn create_router(database: Database, settings: Settings) -> Router {
    let jwt_keys = setup_jwt_keys();
    let media = MediaStorage::new(&settings.media_root);

    Router::new()
        .merge(views::router())
        .merge(admin::router())
        .nest_service("/static", ServeDir::new(&settings.static_root))
        .nest_service("/uploads", ServeDir::new(&settings.media_root))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(database))
        .layer(Extension(jwt_keys))
        .layer(Extension(media))
        .layer(Extension(AdminSite::default()))
        .layer(Extension(settings))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_jwt_keys() -> JwtKeys {
    use crate::password::generate;

    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = generate();
        tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
        jwt_secret
    });

    JwtKeys::new(jwt_secret.as_bytes())
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
