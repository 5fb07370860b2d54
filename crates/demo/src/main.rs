mod app;
mod convert;
mod error;
mod handlers;
mod state;

use anyhow::Result;
use axum_dynamo::backend::memory::MemoryConnector;
use axum_dynamo::{AppConfig, Application, Dynamo, Settings};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{app::create_app, state::AppState};

/// Example server exposing the configured DynamoDB tables over HTTP.
#[derive(Parser, Debug)]
#[command(name = "axum_dynamo_demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Keep tables in process instead of connecting to DynamoDB
    #[arg(long, env = "DEMO_IN_MEMORY")]
    in_memory: bool,

    /// Create the configured tables on startup and wait until they are active
    #[arg(long, env = "DEMO_CREATE_TABLES")]
    create_tables: bool,

    /// Delete the configured tables on shutdown
    #[arg(long)]
    destroy_tables: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "axum_dynamo=debug,axum_dynamo_demo=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Settings come from the environment (DYNAMO_TABLES, DYNAMO_ENABLE_LOCAL, ...)
    let mut application = Application::new(
        "axum_dynamo_demo",
        AppConfig {
            settings: Settings::default(),
            session: None,
        },
    );

    let dynamo = if cli.in_memory {
        Dynamo::new().with_connector(MemoryConnector::new())
    } else {
        Dynamo::new()
    };
    let state = dynamo.init_app(&mut application).await?;

    if cli.create_tables || cli.in_memory {
        let created = state.create_all(true).await?;
        tracing::info!(tables = ?created, "Tables ready");
    }

    let app = create_app(AppState::new(Dynamo::state_for(Some(&application))?));

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if cli.destroy_tables {
        let deleted = state.destroy_all(true).await?;
        tracing::info!(tables = ?deleted, "Tables deleted");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
