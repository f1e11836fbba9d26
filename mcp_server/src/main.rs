//! gcp-mcp-server: an MCP server for Google Cloud Platform.
//!
//! Serves GCP inspection tools over stdio (default) or SSE. Capability
//! groups are selected with `--capabilities`; process-wide defaults for
//! project, location, and organization pre-fill tool parameters.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gcp_backend_interface::rest::{RestClusterManager, RestProjects, RestRunServices};
use mcp_server::config::Defaults;
use mcp_server::registry::RegistryBuilder;
use mcp_server::sse::{SseServer, SseServerConfig};
use mcp_server::tools::{register_capabilities, Backends};
use mcp_server::McpServer;

/// A MCP server implementation for Google Cloud Platform.
#[derive(Parser)]
#[command(name = "gcp-mcp-server", version, about)]
struct Cli {
    /// The capabilities to use. Valid options: all, container, run, project.
    #[arg(short = 'c', long = "capabilities", default_value = "all")]
    capabilities: Vec<String>,

    /// Transport to use.
    #[arg(short = 't', long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// The public SSE base URL to use.
    #[arg(
        short = 'u',
        long = "url",
        env = "BASE_URL",
        default_value = "http://localhost:8000"
    )]
    base_url: String,

    /// The local SSE server port to use.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// The GCP project name.
    #[arg(long, env = "GCP_PROJECT")]
    project: Option<String>,

    /// The GCP location (e.g. europe-west1).
    #[arg(long, env = "GCP_LOCATION")]
    location: Option<String>,

    /// The GCP organization ID.
    #[arg(long, env = "GCP_ORGANIZATION")]
    organization: Option<String>,

    /// OAuth2 access token used for Google Cloud API calls.
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    token: String,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Transport {
    #[default]
    Stdio,
    Sse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol; log to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let defaults = Defaults {
        project: cli.project,
        location: cli.location,
        organization: cli.organization,
    };
    let backends = Backends {
        clusters: Arc::new(RestClusterManager::new(cli.token.clone())),
        projects: Arc::new(RestProjects::new(cli.token.clone())),
        services: Arc::new(RestRunServices::new(cli.token)),
    };

    let mut builder = RegistryBuilder::new(defaults);
    let active = register_capabilities(&mut builder, &cli.capabilities, &backends)?;
    info!(capabilities = ?active, "registered capability groups");

    let server = McpServer::new(builder.build());

    match cli.transport {
        Transport::Stdio => server.serve_stdio().await?,
        Transport::Sse => {
            let config = SseServerConfig::new(cli.port, cli.base_url);
            SseServer::new(config, server).serve().await?;
        }
    }

    Ok(())
}
