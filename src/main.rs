//! Main entry point for the Transfluent CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transfluent_client::cli::commands::{self, Commands};
use transfluent_client::{ClientConfig, TransfluentClient};

/// Transfluent client - translation-management API from the command line
#[derive(Parser, Debug)]
#[command(name = "transfluent", version, about, long_about = None)]
struct Args {
    /// Use the sandbox (demo) servers (defaults to TRANSFLUENT_SANDBOX)
    #[arg(long, global = true)]
    sandbox: bool,

    /// Pre-obtained API token (defaults to TRANSFLUENT_TOKEN env var)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Request timeout in milliseconds (waits indefinitely if not set)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let default_filter = format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), log_level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    if !command.needs_client() {
        if let Commands::ServeWebhook {
            host,
            port,
            path,
            secret,
        } = command
        {
            commands::handle_serve_webhook(host, port, path, secret).await?;
        }
        return Ok(());
    }

    // Override config with CLI args if provided
    let mut config = ClientConfig::from_env()?;
    if args.sandbox {
        config.sandbox = true;
    }
    if let Some(token) = args.token {
        config.token = Some(token);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = Some(timeout_ms);
    }

    let client = TransfluentClient::new(config)?;
    commands::handle(&client, command).await
}
