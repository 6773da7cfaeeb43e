use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse::<IpAddr>().ok()
}

/// Best-effort client address: first `X-Forwarded-For` hop, then `X-Real-IP`,
/// then the socket peer. Header values that are not a literal IP address are
/// skipped.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(parse_ip)
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_ip)
        })
        .or_else(|| peer.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
}
