use std::future::IntoFuture;
use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};

use erp_api::auth::JwtKeys;
use erp_api::config::AppConfig;
use erp_api::database::connect_lazy;
use erp_api::middleware::install_panic_hook;
use erp_api::{init_tracing, router, AppState};

#[derive(Parser)]
#[command(name = "erp-api")]
#[command(about = "ERP backend API server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Override server.port")]
        port: Option<u16>,
    },

    #[command(about = "Issue a bearer token for local testing")]
    Token {
        #[arg(long)]
        user_id: u64,
        #[arg(long)]
        username: String,
    },

    #[command(about = "Print the effective configuration with secrets masked")]
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Token { user_id, username } => {
            let keys = JwtKeys::from_config(&config.jwt)?;
            let issued = keys.issue(user_id, &username)?;
            println!("{}", issued.token);
            eprintln!("expires at {}", issued.expires_at);
            Ok(())
        }
        Commands::Config => {
            config.jwt.secret = "***".to_string();
            config.database.url = config.database.redacted_url();
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    init_tracing(&config.log);
    install_panic_hook();

    info!("Starting ERP API in {:?} mode", config.environment);

    let db = connect_lazy(&config.database)?;
    let bind_addr = config.server.bind_addr();
    let drain = config.server.shutdown_timeout();
    let state = AppState::new(config, db)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("ERP API listening on http://{}", listener.local_addr()?);

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    // Once the signal fires, in-flight requests get `drain` to finish
    tokio::select! {
        result = server => result.context("server error")?,
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(drain).await;
        } => warn!("Drain deadline of {:?} exceeded; dropping open connections", drain),
    }

    info!("ERP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
