//! moviegraph: HTTP traversal API over a movie/person graph

use anyhow::Context;
use clap::Parser;
use moviegraph::config::{AppConfig, BackendKind};
use moviegraph::{AdapterOptions, GraphBackend, GremlinHttpClient, HttpServer, MemoryGraph, QueryAdapter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moviegraph", version, about = "Movie graph traversal API")]
struct Cli {
    /// YAML configuration file
    #[arg(long, env = "MOVIEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Graph backend: gremlin or memory
    #[arg(long)]
    backend: Option<BackendKind>,

    /// JSON fixture for the memory backend
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("moviegraph=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    config
        .apply_env_overrides(|key| std::env::var(key).ok())
        .context("reading environment")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(backend) = cli.backend {
        config.graph.backend = backend;
    }
    if let Some(fixture) = cli.fixture {
        config.graph.fixture_path = Some(fixture);
    }
    config.validate().context("validating configuration")?;

    info!("moviegraph v{}", moviegraph::version());

    let backend = connect_backend(&config)?;
    let adapter = Arc::new(QueryAdapter::new(backend, AdapterOptions::from(&config.adapter)));
    let server = HttpServer::new(Arc::clone(&adapter), config.server.clone());

    server
        .start(shutdown_signal())
        .await
        .with_context(|| format!("serving on {}:{}", config.server.address, config.server.port))?;

    adapter.close().await;
    info!("shutdown complete");
    Ok(())
}

fn connect_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn GraphBackend>> {
    match config.graph.backend {
        BackendKind::Gremlin => {
            let client = GremlinHttpClient::from_config(&config.graph, config.adapter.query_timeout())
                .context("building gremlin client")?;
            info!(
                endpoint = client.endpoint(),
                auth = ?config.graph.auth_mode,
                "using gremlin backend"
            );
            Ok(Arc::new(client))
        }
        BackendKind::Memory => {
            let path = config
                .graph
                .fixture_path
                .as_ref()
                .context("memory backend requires a fixture")?;
            let graph = MemoryGraph::from_fixture(path)
                .with_context(|| format!("loading fixture {}", path.display()))?;
            info!(
                fixture = %path.display(),
                vertices = graph.vertex_count(),
                edges = graph.edge_count(),
                "using in-memory backend"
            );
            Ok(Arc::new(graph))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
    info!("shutdown signal received");
}
