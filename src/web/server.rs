//! Web server implementation
//!
//! Provides the server struct and configuration.

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::routes::{wiki_routes, AppState};
use super::{DEFAULT_BIND, DEFAULT_BODY_LIMIT, DEFAULT_PORT};
use crate::store::{PageStore, DEFAULT_DATA_DIR};
use crate::templates::{TemplateError, TemplateSet, DEFAULT_VIEWS_DIR};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Address to bind to
    pub bind: String,
    /// Directory holding page files
    pub data_dir: PathBuf,
    /// Directory holding the template files
    pub views_dir: PathBuf,
    /// Maximum request body size in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            views_dir: PathBuf::from(DEFAULT_VIEWS_DIR),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the views directory
    pub fn with_views_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.views_dir = dir.into();
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Wiki server instance
pub struct WikiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl WikiServer {
    /// Create a server from the given configuration
    ///
    /// Loads and compiles the template set; a missing or malformed
    /// template fails here, before anything is bound.
    pub fn new(config: ServerConfig) -> Result<Self, TemplateError> {
        let templates = TemplateSet::load(&config.views_dir)?;
        let store = PageStore::new(&config.data_dir);
        let state = Arc::new(AppState::new(store, templates));
        Ok(Self { config, state })
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router
    fn build_router(&self) -> Router {
        wiki_routes()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(self.config.body_limit))
            .with_state(self.state.clone())
    }

    /// Run the server
    ///
    /// Blocks forever; there is no graceful shutdown.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.state.store.ensure_dir()?;

        let addr = self.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!(%addr, data_dir = %self.config.data_dir.display(), "starting wiki server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
