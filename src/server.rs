//! Reference target server for local benchmarking.
//!
//! Serves the benchmark payload at `/test-file` and a `/health` probe. The
//! payload is either generated in memory or read from a file on every
//! request; a missing file makes both routes answer 500.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Where the served payload comes from.
#[derive(Debug, Clone)]
pub enum Payload {
    /// An in-memory buffer of zero bytes.
    Generated(Bytes),
    /// A file read from disk on each request.
    File(PathBuf),
}

impl Payload {
    /// An in-memory payload of `size` bytes.
    pub fn generated(size: usize) -> Self {
        Self::Generated(Bytes::from(vec![0u8; size]))
    }

    fn is_available(&self) -> bool {
        match self {
            Self::Generated(_) => true,
            Self::File(path) => path.is_file(),
        }
    }
}

/// Configuration for the target server.
#[derive(Debug, Clone)]
pub struct TargetServerConfig {
    /// Address to bind.
    pub addr: SocketAddr,
    /// Payload served at `/test-file`.
    pub payload: Payload,
}

/// Builds the router serving `/test-file` and `/health`.
pub fn router(payload: Payload) -> Router {
    Router::new()
        .route("/test-file", get(test_file))
        .route("/health", get(health))
        .with_state(Arc::new(payload))
}

/// Binds and serves until the process is stopped.
pub async fn serve(config: TargetServerConfig) -> Result<()> {
    if let Payload::File(path) = &config.payload {
        if !path.is_file() {
            error!(path = %path.display(), "test file not found");
        }
    }

    let listener = TcpListener::bind(config.addr).await?;
    info!("Target server running on http://{}", listener.local_addr()?);
    axum::serve(listener, router(config.payload)).await?;
    Ok(())
}

async fn test_file(State(payload): State<Arc<Payload>>) -> Response {
    match payload.as_ref() {
        Payload::Generated(bytes) => bytes.clone().into_response(),
        Payload::File(path) => match tokio::fs::read(path).await {
            Ok(bytes) => bytes.into_response(),
            Err(e) => {
                error!(path = %path.display(), "error sending file: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Test file missing").into_response()
            },
        },
    }
}

async fn health(State(payload): State<Arc<Payload>>) -> Response {
    if payload.is_available() {
        (StatusCode::OK, "OK").into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Test file missing").into_response()
    }
}
