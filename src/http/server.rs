//! HTTP server for the traversal API

use super::handler::{
    cast_handler, edges_handler, filmography_handler, health_handler, neighbors_handler,
    not_found_handler, recommendations_handler, search_handler, subgraph_handler, vertex_handler,
    AppState,
};
use crate::adapter::QueryAdapter;
use crate::config::ServerConfig;
use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router, mounted under `route_prefix` when non-empty
pub fn build_router(state: AppState, route_prefix: &str) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/vertices/:id", get(vertex_handler))
        .route("/vertices/:id/edges", get(edges_handler))
        .route("/vertices/:id/neighbors", get(neighbors_handler))
        .route("/vertices/:id/subgraph", get(subgraph_handler))
        .route("/search", get(search_handler))
        .route("/movies/:id/cast", get(cast_handler))
        .route("/movies/:id/recommendations", get(recommendations_handler))
        .route("/people/:id/movies", get(filmography_handler))
        .with_state(state);

    let app = if route_prefix.is_empty() {
        api
    } else {
        Router::new().nest(route_prefix, api)
    };

    app.fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// HTTP server owning the adapter for its lifetime
pub struct HttpServer {
    adapter: Arc<QueryAdapter>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(adapter: Arc<QueryAdapter>, config: ServerConfig) -> Self {
        Self { adapter, config }
    }

    pub fn router(&self) -> Router {
        build_router(AppState::new(Arc::clone(&self.adapter)), &self.config.route_prefix)
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start<F>(&self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = %listener.local_addr()?,
            prefix = %self.config.route_prefix,
            backend = self.adapter.backend_name(),
            "movie graph API listening"
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
