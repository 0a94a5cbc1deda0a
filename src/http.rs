//! HTTP responder for connections that open with an HTTP request line.
//!
//! The chat port doubles as a tiny HTTP endpoint: `curl` pointed at it gets
//! answered instead of greeted. The session has already consumed the
//! request line and possibly some of the headers, so those bytes are
//! replayed in front of the socket before hyper sees it. Exactly one
//! request is served per connection.
//!
//! Routes:
//! - `POST /publish/:topic` publishes the request body to the broker
//! - `GET /healthz` answers `ok`

use crate::state::Matrix;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::{debug, info, warn};

/// Routes served on a handed-off connection.
pub fn router(matrix: Arc<Matrix>) -> Router {
    Router::new()
        .route("/publish/:topic", post(publish_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(matrix)
}

/// Handler for POST /publish/:topic.
async fn publish_handler(
    State(matrix): State<Arc<Matrix>>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Response {
    let mut publisher = match matrix.broker.publisher().await {
        Ok(publisher) => publisher,
        Err(e) => {
            warn!(topic = %topic, error = %e, "Publisher unavailable");
            return (StatusCode::BAD_GATEWAY, e.to_string()).into_response();
        }
    };

    match publisher.publish(&topic, body).await {
        Ok(()) => {
            debug!(topic = %topic, "Published over HTTP");
            Json(serde_json::json!({})).into_response()
        }
        Err(e) => {
            warn!(topic = %topic, error = %e, "HTTP publish failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Handler for GET /healthz.
async fn healthz_handler() -> &'static str {
    "ok"
}

/// Serve one HTTP/1 request on `io`, reading `replay` first.
pub async fn serve_handoff<S>(io: S, replay: Bytes, matrix: Arc<Matrix>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    info!(bytes = replay.len(), "Handing connection to HTTP responder");
    let io = TokioIo::new(Rewind::new(io, replay));
    let service = TowerToHyperService::new(router(matrix));

    if let Err(e) = http1::Builder::new()
        .keep_alive(false)
        .serve_connection(io, service)
        .await
    {
        debug!(error = %e, "HTTP connection error");
    }
}

/// A stream that yields `prefix` before reading from `inner`.
struct Rewind<S> {
    prefix: Bytes,
    inner: S,
}

impl<S> Rewind<S> {
    fn new(inner: S, prefix: Bytes) -> Self {
        Self { prefix, inner }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for Rewind<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if !self.prefix.is_empty() {
            let n = self.prefix.len().min(buf.remaining());
            let chunk = self.prefix.split_to(n);
            buf.put_slice(&chunk);
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Rewind<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
