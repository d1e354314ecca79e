#![forbid(unsafe_code)]

mod actors;
mod commands;
mod config;
mod error;
mod facade;
mod github;
mod models;
mod notifier;
mod publisher;
mod repository;
mod utils;
mod watchers;

use std::{process::exit, str::FromStr, sync::Arc, time::Duration};

use clap::Parser;
use commands::{Cli, CommandError};
use config::AppConfig;
use facade::{spawn_facade, FacadeHandle};
use github::GitHubClient;
use notifier::{LogNotifier, Notifier};
use publisher::Publisher;
use repository::{CredentialsRepository, HistoryRepository};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tokio::{select, signal};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppState {
    pub publisher: Arc<Publisher>,
    pub credentials: CredentialsRepository,
    pub history: HistoryRepository,
    pub facade: FacadeHandle,
    pub notifier: Arc<dyn Notifier>,
    pub http_timeout: Duration,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "codesync=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let db_pool = match setup_database(&app_config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    let state = match build_state(&app_config, db_pool.clone()) {
        Ok(state) => state,
        Err(err) => {
            error!("Could not start: {err}");
            exit(255);
        }
    };

    let exit_code = select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            0
        },

        result = commands::run(&state, cli.command) => match result {
            Ok(output) => {
                println!("{}", output.trim_end());
                0
            }
            Err(CommandError::User { message }) => {
                eprintln!("{message}");
                1
            }
            Err(CommandError::Internal { message }) => {
                error!("Internal error: {message}");
                255
            }
        },
    };

    db_pool.close().await;
    exit(exit_code);
}

fn build_state(config: &AppConfig, pool: SqlitePool) -> anyhow::Result<AppState> {
    let github = GitHubClient::new(&config.github_api_url, config.http_timeout())?;

    let credentials = CredentialsRepository::new(pool.clone());
    let history = HistoryRepository::new(pool);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let publisher = Arc::new(Publisher::new(
        Arc::new(github),
        credentials.clone(),
        history.clone(),
        notifier.clone(),
        config.github_branch.clone(),
    ));

    Ok(AppState {
        facade: spawn_facade(publisher.clone()),
        publisher,
        credentials,
        history,
        notifier,
        http_timeout: config.http_timeout(),
    })
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    info!("Running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Done!");
    Ok(pool)
}
