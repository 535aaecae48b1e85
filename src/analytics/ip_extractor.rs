//! Client IP extraction for requests arriving through a local proxy
//!
//! The `X-Forwarded-For` header is only honoured when the socket peer is one
//! of the configured trusted proxy networks (loopback by default). The
//! leftmost entry of the header is the originating client. The value is kept
//! as text since stored visits carry no format validation beyond non-empty.

use axum::http::HeaderMap;
use ipnet::IpNet;
use std::net::IpAddr;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Determine the address a visit should be recorded under
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `peer` - The socket remote address
/// * `trusted_proxies` - Peers allowed to supply `X-Forwarded-For`
pub fn extract_client_ip(headers: &HeaderMap, peer: IpAddr, trusted_proxies: &[IpNet]) -> String {
    let peer = canonical(peer);

    if !trusted_proxies.iter().any(|net| net.contains(&peer)) {
        return peer.to_string();
    }

    forwarded_for(headers).unwrap_or_else(|| peer.to_string())
}

/// Leftmost non-empty entry of `X-Forwarded-For`
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let xff = headers.get(FORWARDED_FOR_HEADER)?.to_str().ok()?;

    xff.split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// IPv4-mapped IPv6 peers (dual-stack listeners) compare as IPv4
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}
