//! Companion CLI: checks the configured backend and writes sample groups.

use axum::http::{HeaderValue, Method, Uri};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use group_logger::config::{load_config, GroupLogConfig};
use group_logger::group::TRACE_HEADER;
use group_logger::{Client, Entry, HttpRequest, LoggerOptions, RequestContext, Severity};

#[derive(Parser)]
#[command(name = "grouplog-cli")]
#[command(about = "Check and exercise a grouped logging backend", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write "ping" to the `ping` log and report whether it was accepted
    Ping,
    /// Write one group: an inner entry per severity, then the outer entry
    Emit {
        /// Logical log name
        #[arg(short, long, default_value = "cli")]
        name: String,

        /// Trace context to group under; a UUID is generated otherwise
        #[arg(short, long)]
        trace: Option<String>,

        /// Inner entry severities, e.g. info alert error
        #[arg(default_values_t = vec!["info".to_string()])]
        severities: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GroupLogConfig::default(),
    };
    let client = Client::from_config(&config.backend).await?;

    match cli.command {
        Commands::Ping => match client.ping().await {
            Ok(()) => eprintln!("{}: ok", client.full_log_name("ping")),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Emit {
            name,
            trace,
            severities,
        } => {
            let mut request = RequestContext::new(Method::POST, Uri::from_static("/cli/emit"));
            if let Some(trace) = trace {
                let value = HeaderValue::from_str(&trace)?;
                request = request.with_header(TRACE_HEADER.parse()?, value);
            }

            let mut logger = client.logger(Some(Arc::new(request)), &name, &LoggerOptions::new());
            for (index, level) in severities.iter().enumerate() {
                let severity = Severity::parse(level);
                logger.log(Entry::new(
                    severity,
                    json!({ "message": format!("entry {}", index + 1), "severity": severity }),
                ));
            }
            logger.close_with(HttpRequest {
                status: 200,
                ..Default::default()
            });

            eprintln!(
                "group {}: {} inner entries, outer severity {}",
                logger.group_id(),
                logger.inner_entries().len(),
                logger.max_severity()
            );
        }
    }

    client.close().await?;
    Ok(())
}
