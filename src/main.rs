//! Excel to PDF MCP Server - Entry point
//!
//! Serves the conversion tools over stdio (default) or the HTTP API.

use clap::{Parser, Subcommand};
use excel_to_pdf_mcp::config::{DEFAULT_PORT, DEFAULT_SOFFICE_BINARY};
use excel_to_pdf_mcp::convert::preflight::{check_converter, INSTALL_GUIDANCE};
use excel_to_pdf_mcp::source::ensure_dir;
use excel_to_pdf_mcp::{
    http, run_server_with_config, HttpConfig, LibreOfficeConverter, ServerConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "excel-to-pdf-mcp",
    version,
    about = "MCP server for converting Excel and Numbers files to PDF"
)]
struct Cli {
    /// LibreOffice executable used for conversions
    #[arg(long, env = "LIBREOFFICE_BIN", default_value = DEFAULT_SOFFICE_BINARY, global = true)]
    soffice: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the MCP tools over stdio (default)
    Stdio,
    /// Serve the HTTP conversion API
    Http {
        /// Port to run the server on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Host to bind the server to
        #[arg(long, default_value = "localhost")]
        host: String,
        /// Base URL advertised in the resource manifest
        #[arg(long, env = "MCP_BASE_URL")]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout belongs to the stdio transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "excel_to_pdf_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_current_dir()?.with_soffice_binary(cli.soffice);

    match cli.command.unwrap_or(Command::Stdio) {
        Command::Stdio => run_stdio(config).await,
        Command::Http {
            port,
            host,
            base_url,
        } => run_http(config, HttpConfig::new(host, port, base_url)).await,
    }
}

async fn run_stdio(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Excel to PDF MCP Server");

    // Keep serving: each conversion call reports the missing dependency
    if let Err(e) = check_converter(&config.soffice_binary).await {
        tracing::warn!(error = %e, "LibreOffice not found in PATH; conversions will fail until it is installed");
    }

    run_server_with_config(config).await
}

async fn run_http(config: ServerConfig, http_config: HttpConfig) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %http_config.base_url,
        "Starting Excel to PDF HTTP server"
    );

    if let Err(e) = check_converter(&config.soffice_binary).await {
        tracing::error!(error = %e, "LibreOffice is not installed or not found in PATH");
        eprintln!("Error: LibreOffice is not installed or not found in PATH.");
        eprintln!("{}", INSTALL_GUIDANCE);
        std::process::exit(1);
    }

    ensure_dir(&config.upload_dir).await;
    ensure_dir(&config.output_dir).await;

    let converter = Arc::new(LibreOfficeConverter::new(config.soffice_binary.clone()));
    http::serve(config, http_config, converter).await
}
