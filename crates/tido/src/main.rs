use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tido_server::ServerConfig;

// ── CLI definition ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tido", about = "Tido — multi-user todo service", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Tido HTTP server
    Serve {
        /// Port to listen on (default: $TIDO_PORT or 8080)
        #[arg(long, env = "TIDO_PORT", default_value = "8080")]
        port: u16,
        /// Host to bind (default: $TIDO_HOST or 0.0.0.0)
        #[arg(long, env = "TIDO_HOST", default_value = "0.0.0.0")]
        host: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TIDO_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => {
            let cfg = ServerConfig {
                host,
                port,
                ..ServerConfig::default()
            };
            tido_server::run(cfg).await
        }
    }
}
