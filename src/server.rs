//! HTTP server and graceful shutdown.
//!
//! [`App::handle`] works without a listener; this module is the thin layer
//! that puts an `App` on a socket.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **Ctrl-C** the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::app::App;
use crate::error::Error;
use crate::response::Response;

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use sento::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// # let _ = server;
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { addr: addr.parse()? })
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// Accepts a [`Router`](crate::Router) too; it is built first.
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, app: impl Into<App>) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let app = Arc::new(app.into());

        info!(addr = %self.addr, routes = app.route_count(), "sento listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("sento stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Collects the body, runs the app, and maps a handler failure to `500`.
///
/// The server is the embedder: it is the one place that decides what a
/// handler failure looks like on the wire.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let response = match app.handle(http::Request::from_parts(parts, body)).await {
        Ok(res) => res,
        Err(e) => {
            error!(peer = %remote_addr, %method, %path, "request failed: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both SIGTERM and SIGINT (Ctrl-C). A signal that
/// cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
