//! Per-client admission control in front of every route.
//!
//! Clients are keyed by the TCP peer address. With
//! `rate_limit.trust_proxy_headers` set, the first `X-Forwarded-For` entry and
//! then `X-Real-IP` take precedence. Requests with no usable identity share
//! the `"unknown"` bucket.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

const UNKNOWN_CLIENT: &str = "unknown";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn forwarded_client(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
}

pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        if let Some(client) = forwarded_client(headers) {
            return client.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(
        req.headers(),
        peer,
        state.config.rate_limit.trust_proxy_headers,
    );

    if !state.limiter.allow(&key) {
        tracing::warn!("Rate limit exceeded for client: {key}");
        return AppError::TooManyRequests.into_response();
    }

    next.run(req).await
}
