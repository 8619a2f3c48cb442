//! Request middleware
//!
//! - [`bind_store`] checks a store handle out for the lifetime of one request
//! - [`real_ip`] resolves the client address behind proxies

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use super::error::ApiError;
use crate::breaker::Permit;
use crate::db::AlbumSource;
use crate::error::{AccessError, AcquireError};
use crate::models::Album;
use crate::state::AppState;

/// A store handle scoped to one request.
///
/// Stored in request extensions by [`bind_store`]. The underlying
/// connection goes back to the pool when the last clone is dropped, which
/// happens when the request finishes on any path: response, error, panic
/// unwind or timeout.
#[derive(Clone)]
pub struct StoreHandle {
    lease: Arc<Mutex<Lease>>,
}

struct Lease {
    source: Box<dyn AlbumSource>,
    acquired_at: Instant,
}

impl Drop for Lease {
    fn drop(&mut self) {
        tracing::debug!(
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "store handle released"
        );
    }
}

impl StoreHandle {
    pub fn new(source: Box<dyn AlbumSource>) -> Self {
        Self {
            lease: Arc::new(Mutex::new(Lease {
                source,
                acquired_at: Instant::now(),
            })),
        }
    }

    pub async fn list_albums(&self) -> Result<Vec<Album>, AccessError> {
        self.lease.lock().await.source.list_albums().await
    }
}

/// Acquire a store handle and attach it to the request.
///
/// Acquisition failures fail only this request with 503 and feed the
/// circuit breaker; while the breaker is open the store is not contacted.
pub async fn bind_store(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let breaker = state.breaker();

    if let Permit::Rejected { remaining } = breaker.check(Instant::now()) {
        let err = AcquireError::CircuitOpen {
            remaining_ms: remaining.as_millis() as u64,
        };
        return ApiError::from(err).into_response();
    }

    let source = match state.connector().acquire().await {
        Ok(source) => {
            breaker.record_success();
            source
        }
        Err(err) => {
            breaker.record_failure(Instant::now());
            return ApiError::from(err).into_response();
        }
    };

    tracing::debug!("store handle acquired");
    req.extensions_mut().insert(StoreHandle::new(source));
    next.run(req).await
}

/// Client address as seen through proxy headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Resolve the client IP and record it on the request span.
pub async fn real_ip(mut req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = resolve_client_ip(req.headers(), peer) {
        tracing::Span::current().record("client_ip", tracing::field::display(ip));
        req.extensions_mut().insert(ClientIp(ip));
    }

    next.run(req).await
}

/// `True-Client-IP`, then `X-Real-IP`, then the first `X-Forwarded-For`
/// entry, then the socket peer. Unparseable header values are skipped.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
    };

    header("true-client-ip")
        .and_then(|v| v.parse().ok())
        .or_else(|| header("x-real-ip").and_then(|v| v.parse().ok()))
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .and_then(|first| first.trim().parse().ok())
        })
        .or(peer)
}
