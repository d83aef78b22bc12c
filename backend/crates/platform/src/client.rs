//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, header};
use std::net::{IpAddr, SocketAddr};

/// Fallback identifier when neither a proxy header nor a socket address is known
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Direct connection IP, if the server was started with connect info
pub fn connect_ip(extensions: &Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

/// Identify the client for rate limiting and click analytics
///
/// Uses the first `X-Forwarded-For` entry when present (reverse proxy setups),
/// else the direct connection address.
pub fn client_identifier(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match (forwarded, direct_ip) {
        (Some(first), _) => first.to_string(),
        (None, Some(ip)) => ip.to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

/// `User-Agent` header as an owned string
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
