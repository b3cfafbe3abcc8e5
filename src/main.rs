//! Demo server: logs every request as a group.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use group_logger::config::{load_config, GroupLogConfig};
use group_logger::observability::{logging, metrics};
use group_logger::platform::{with_hostname_via, GceMetadata};
use group_logger::{Client, HttpServer, LoggerOptions};

#[derive(Parser)]
#[command(name = "group-logger")]
#[command(about = "HTTP server that groups each request's log entries", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GroupLogConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("group-logger v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        parent = %config.backend.parent,
        output = ?config.backend.output,
        bind_address = %config.server.bind_address,
        log_name = %config.server.log_name,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = Arc::new(Client::from_config(&config.backend).await?);

    let mut options = LoggerOptions::new();
    if config.metadata.hostname_label {
        let metadata = GceMetadata::from_config(&config.metadata);
        options = options.with_common_labels(with_hostname_via(&metadata, None).await);
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, client.clone(), options);
    server.run(listener).await?;

    client.close().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
