// src/main.rs

mod access_log;
mod auth;
mod cli;
mod config;
mod error;
mod models;
mod routes;
mod sanitize;
mod store;

use access_log::LogRotator;
use auth::AuthGate;
use clap::Parser;
use cli::{Cli, LogFormat};
use config::Settings;
use error::Result;
use routes::{make_router, AppState};
use store::NoteStore;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "minikeep=info,tower_http=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli)?;

    let store = NoteStore::open(&settings.data_dir)?;
    std::fs::create_dir_all(&settings.log_dir)?;
    let gate = AuthGate::new(&settings.password);
    let password_required = !gate.is_open();
    let access_log = LogRotator::new(&settings.log_dir, settings.log_retention_hours);

    info!(
        data_dir = %store.dir().display(),
        log_dir = %access_log.dir().display(),
        retention_hours = settings.log_retention_hours,
        password_required,
        "state initialized"
    );

    let app = make_router(AppState::new(store, gate, access_log));

    let address = settings.address();
    let listener = TcpListener::bind(&address).await?;
    info!("Serving on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
