//! Private Address Guard
//!
//! Keeps profile picture imports away from loopback, private and reserved
//! networks.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use super::FetchError;

/// Blocked hostname patterns, compared lower-cased.
const BLOCKED_HOSTNAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
];

/// Static check of a URL host. DNS is resolved later, at fetch time.
pub fn is_blocked_host(host: &str) -> bool {
    let lower = host.to_lowercase();
    if BLOCKED_HOSTNAMES.contains(&lower.as_str()) || lower.ends_with(".localhost") {
        return true;
    }

    let trimmed = host.trim_start_matches('[').trim_end_matches(']');
    trimmed.parse::<IpAddr>().is_ok_and(|ip| is_private_ip(&ip))
}

/// Whether `ip` is loopback, private, link-local or otherwise reserved.
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local() // 169.254.0.0/16, cloud metadata
                || v4.is_broadcast()
                || v4.is_unspecified()
                || a == 0
                || (a == 100 && (b & 0xC0) == 64) // 100.64.0.0/10 (CGN)
                || (a == 198 && (b & 0xFE) == 18) // 198.18.0.0/15
                || (a == 192 && b == 0 && (c == 0 || c == 2)) // 192.0.0.0/24, TEST-NET-1
                || (a == 198 && b == 51 && c == 100) // TEST-NET-2
                || (a == 203 && b == 0 && c == 113) // TEST-NET-3
                || a >= 224 // multicast and reserved
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xFE00) == 0xFC00 // fc00::/7
                || (v6.segments()[0] & 0xFFC0) == 0xFE80 // fe80::/10
                || is_v4_mapped_private(v6)
        }
    }
}

fn is_v4_mapped_private(v6: &Ipv6Addr) -> bool {
    v6.to_ipv4_mapped()
        .is_some_and(|v4| is_private_ip(&IpAddr::V4(v4)))
}

/// A host together with the checked address the request must go to.
#[derive(Debug, Clone)]
pub struct PinnedHost {
    pub host: String,
    pub addr: SocketAddr,
}

/// Resolve the URL host and refuse it if any address is private.
///
/// The returned address is pinned on the client so a second resolution
/// cannot swap in another target.
pub async fn verify_resolved_ip(url: &reqwest::Url) -> Result<PinnedHost, FetchError> {
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::Blocked("URL has no host".into()))?
        .to_string();
    let port = url.port_or_known_default().unwrap_or(443);

    if is_blocked_host(&host) {
        return Err(FetchError::Blocked(host));
    }

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(PinnedHost {
            addr: SocketAddr::new(ip, port),
            host,
        });
    }

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| FetchError::Request(format!("DNS resolution failed for {host}: {e}")))?
        .collect();

    if let Some(private) = addrs.iter().find(|addr| is_private_ip(&addr.ip())) {
        return Err(FetchError::Blocked(format!(
            "{host} resolved to {}",
            private.ip()
        )));
    }

    let addr = addrs
        .first()
        .copied()
        .ok_or_else(|| FetchError::Request(format!("No addresses found for {host}")))?;

    Ok(PinnedHost { host, addr })
}
