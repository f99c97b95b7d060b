//! Liveness endpoint for container orchestration.
//!
//! Answers every GET with `200 Bot is running!`. It reports only that the
//! process is up, not whether Telegram or the inference endpoint work.

use std::{future::Future, net::SocketAddr};

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use htb_core::{errors::Error, Result};

pub const LIVENESS_BODY: &str = "Bot is running!";

async fn liveness(method: Method) -> Response {
    if method == Method::GET || method == Method::HEAD {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            LIVENESS_BODY,
        )
            .into_response()
    } else {
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    }
}

/// Any path, any method; non-GET methods get 405.
pub fn router() -> Router {
    Router::new().fallback(liveness)
}

/// A bound but not yet serving liveness listener.
pub struct HealthServer {
    listener: TcpListener,
}

impl HealthServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve on a background task until cancelled or the server fails.
    pub fn spawn(self) -> HealthHandle {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let listener = self.listener;

        let task = tokio::spawn(async move {
            axum::serve(listener, router())
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await
                .map_err(Error::Io)
        });

        HealthHandle { shutdown, task }
    }
}

/// Supervision handle for the liveness task.
pub struct HealthHandle {
    shutdown: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl HealthHandle {
    /// Wait for the task to end and surface why it ended.
    ///
    /// Returns `Ok(())` only after a requested shutdown.
    pub async fn wait(&mut self) -> Result<()> {
        let outcome = (&mut self.task)
            .await
            .map_err(|e| Error::External(format!("liveness task panicked: {e}")))?;
        match outcome {
            Ok(()) if self.shutdown.is_cancelled() => Ok(()),
            Ok(()) => Err(Error::External(
                "liveness server stopped unexpectedly".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        self.wait().await
    }
}

/// Drive `main` to completion alongside the liveness task.
///
/// If the liveness task ends first its outcome is logged and `main` keeps
/// running alone. If `main` ends first the liveness task is shut down.
pub async fn supervise<F: Future>(main: F, health: Option<HealthHandle>) -> F::Output {
    let Some(mut handle) = health else {
        return main.await;
    };

    tokio::pin!(main);
    tokio::select! {
        out = &mut main => {
            if let Err(e) = handle.shutdown().await {
                tracing::error!("liveness server shutdown failed: {e}");
            }
            out
        }
        res = handle.wait() => {
            match res {
                Ok(()) => tracing::warn!("liveness server stopped"),
                Err(e) => tracing::error!("liveness server failed: {e}"),
            }
            main.await
        }
    }
}
