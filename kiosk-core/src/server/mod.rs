// SPDX-FileCopyrightText: 2026 Kiosk Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local content server
//!
//! Serves the content root over HTTP on loopback so a rendering
//! surface can load it like a normal web origin. GET-only static file
//! serving: `/` maps to `index.html`, everything else resolves under
//! the root through the same path sanitizer the store uses. Escapes,
//! misses, and non-GET methods are all 404; a read error on an
//! existing file is a 500 with no internal detail in the body.
//!
//! The server holds no mutable state; it only reads the root while the
//! store writes other paths concurrently.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::content::sanitize_relative_path;

/// Shared state for the static file handler.
#[derive(Clone)]
pub struct ServeState {
    /// The content root being served.
    pub root: PathBuf,
}

/// Creates the router serving static files out of the content root.
pub fn create_router(state: ServeState) -> Router {
    Router::new().fallback(serve_content).with_state(state)
}

async fn serve_content(State(state): State<ServeState>, request: Request<Body>) -> Response {
    if request.method() != Method::GET {
        return not_found();
    }

    let uri_path = request.uri().path();
    let relative = if uri_path == "/" {
        "index.html"
    } else {
        uri_path.trim_start_matches('/')
    };

    let clean = match sanitize_relative_path(relative) {
        Ok(p) => p,
        Err(_) => {
            warn!(target: "server", path = %uri_path, "rejected path outside content root");
            return not_found();
        }
    };

    let full = state.root.join(&clean);
    if full.is_dir() {
        return not_found();
    }

    match tokio::fs::read(&full).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(relative))],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(),
        Err(e) => {
            error!(target: "server", path = %uri_path, error = %e, "failed to read content file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Content type derived from the file extension.
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match extension {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Errors that can occur while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the loopback listener failed.
    #[error("failed to bind content server: {0}")]
    Bind(#[from] io::Error),
}

/// A running content server with a graceful shutdown handle.
pub struct ContentServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ContentServer {
    /// Bind the server to loopback on `port` (0 for ephemeral) and
    /// start the accept loop.
    pub async fn bind(root: PathBuf, port: u16) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
        let addr = listener.local_addr()?;
        let router = create_router(ServeState { root });
        let (shutdown, rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = serve.await {
                error!(target: "server", error = %e, "content server error");
            }
        });

        info!(target: "server", %addr, "content server listening");
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    /// The bound loopback address.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for the accept loop to end.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
        info!(target: "server", "content server stopped");
    }
}
