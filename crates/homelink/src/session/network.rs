//! Local-network address classification.
//!
//! Decides whether a hub host is private to the home network. This backs a
//! security gate on the connection configuration, not a reachability check:
//! an unencrypted scheme is only ever accepted for a private host, and a
//! violating configuration is rejected outright rather than downgraded.

use std::net::Ipv4Addr;
use std::net::Ipv6Addr;

use url::Host;
use url::Url;

/// Whether a hostname or IP literal is private to the local network.
///
/// Private means loopback, `localhost`, a `.local`/`.lan` name, an RFC1918
/// range, or the 169.254.0.0/16 link-local range.
pub fn is_private_host(host: &str) -> bool {
    let trimmed = host.trim().trim_matches(['[', ']']);
    if trimmed.is_empty() {
        return false;
    }

    if let Ok(v4) = trimmed.parse::<Ipv4Addr>() {
        return v4.is_loopback() || v4.is_private() || v4.is_link_local();
    }
    if let Ok(v6) = trimmed.parse::<Ipv6Addr>() {
        return v6.is_loopback();
    }

    let lower = trimmed.to_lowercase();
    lower == "localhost" || lower.ends_with(".local") || lower.ends_with(".lan")
}

/// Reject an unencrypted URL whose host is not private.
///
/// Returns the reason the configuration is invalid, or `None` when the URL is
/// acceptable as a hub base URL.
pub fn insecure_scheme_violation(url: &Url) -> Option<String> {
    if url.scheme() != "http" {
        return None;
    }
    let private = match url.host() {
        Some(Host::Domain(domain)) => is_private_host(domain),
        Some(Host::Ipv4(v4)) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        Some(Host::Ipv6(v6)) => v6.is_loopback(),
        None => false,
    };
    if private {
        None
    } else {
        Some(format!(
            "unencrypted hub connection to non-private host '{}' is not allowed; \
             use https or a local address",
            url.host_str().unwrap_or("")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_hosts() {
        for host in [
            "127.0.0.1",
            "10.0.0.5",
            "172.16.4.1",
            "172.31.255.254",
            "192.168.1.20",
            "169.254.10.10",
            "::1",
            "[::1]",
            "localhost",
            "LOCALHOST",
            "hub.local",
            "Hub.LAN",
        ] {
            assert!(is_private_host(host), "{host} should be private");
        }
    }

    #[test]
    fn public_hosts() {
        for host in [
            "8.8.8.8",
            "172.32.0.1",
            "192.169.0.1",
            "example.com",
            "hub.example.org",
            "2001:db8::1",
            "",
        ] {
            assert!(!is_private_host(host), "{host} should not be private");
        }
    }

    #[test]
    fn insecure_scheme_needs_a_private_host() {
        let ok = Url::parse("http://192.168.1.20:8123").unwrap();
        assert!(insecure_scheme_violation(&ok).is_none());

        let local_name = Url::parse("http://hub.local").unwrap();
        assert!(insecure_scheme_violation(&local_name).is_none());

        let bad = Url::parse("http://hub.example.com").unwrap();
        let reason = insecure_scheme_violation(&bad).unwrap();
        assert!(reason.contains("hub.example.com"));
    }

    #[test]
    fn https_is_always_acceptable() {
        let url = Url::parse("https://hub.example.com").unwrap();
        assert!(insecure_scheme_violation(&url).is_none());
    }
}
