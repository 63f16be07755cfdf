//! Client address resolution for IP-based lookups.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::info;

use crate::error::ApiError;

/// Proxy headers consulted before the socket peer address, in order.
const FORWARDING_HEADERS: [&str; 3] = ["X-Forwarded-For", "Proxy-Client-IP", "WL-Proxy-Client-IP"];

/// The caller's IP address as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

fn usable(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case("unknown")
}

/// Pick the client address from proxy headers or the peer address.
///
/// Comma-separated header values resolve to their first entry; IPv6
/// loopback is reported as `127.0.0.1`.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = FORWARDING_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| usable(value))
        .map(str::to_string);

    let ip = forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()))?;

    let first = ip.split(',').next().unwrap_or_default().trim().to_string();
    let ip = match first.as_str() {
        "::1" | "0:0:0:0:0:0:0:1" => "127.0.0.1".to_string(),
        _ => first,
    };

    Some(ip)
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let ip = resolve_client_ip(&parts.headers, peer)
            .ok_or_else(|| ApiError::bad_request("Unable to determine client IP address"))?;

        info!(client_ip = %ip, "Resolved client IP address");
        Ok(ClientIp(ip))
    }
}
