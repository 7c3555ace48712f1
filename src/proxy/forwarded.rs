//! Trusted-proxy forwarded-header resolution.
//!
//! # Responsibilities
//! - Parse comma-separated `X-Forwarded-*` header chains
//! - Select the value appended by the nearest trusted proxy
//! - Rewrite transport metadata (address, scheme, host, port, prefix)
//! - Preserve the pre-resolution values for downstream inspection
//!
//! # Design Decisions
//! - Trust counts are fixed at construction; 0 means never honored
//! - A chain shorter than its trust count is treated as absent
//! - Token contents are not validated; configured proxies are trusted,
//!   header contents are not second-guessed
//! - `X-Original-Forwarded-For` is checked strictly after
//!   `X-Forwarded-For` and overrides it when both are trusted

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Number of trusted proxy hops per forwarded-header kind.
///
/// Each count is the number of values to trust in the corresponding
/// header, counted from the right (most recently appended) end of the
/// comma-separated chain. It is a security issue to trust values that
/// came from the client rather than a proxy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrustedProxies {
    /// Values to trust for `X-Forwarded-For`.
    pub x_for: usize,

    /// Values to trust for `X-Original-Forwarded-For`.
    pub x_original_for: usize,

    /// Values to trust for `X-Forwarded-Proto`.
    pub x_proto: usize,

    /// Values to trust for `X-Forwarded-Host`.
    pub x_host: usize,

    /// Values to trust for `X-Forwarded-Port`.
    pub x_port: usize,

    /// Values to trust for `X-Forwarded-Prefix`.
    pub x_prefix: usize,
}

impl Default for TrustedProxies {
    fn default() -> Self {
        Self {
            x_for: 1,
            x_original_for: 0,
            x_proto: 1,
            x_host: 0,
            x_port: 0,
            x_prefix: 0,
        }
    }
}

impl TrustedProxies {
    /// A configuration that honors no forwarded headers at all.
    pub fn none() -> Self {
        Self {
            x_for: 0,
            x_original_for: 0,
            x_proto: 0,
            x_host: 0,
            x_port: 0,
            x_prefix: 0,
        }
    }
}

/// Per-request transport metadata, the axum rendition of the WSGI
/// environ fields the forwarded headers are allowed to rewrite.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ForwardedMetadata {
    /// Client address as seen by (or reported to) the service.
    pub remote_addr: Option<String>,

    /// URL scheme ("http" or "https", but not validated).
    pub scheme: Option<String>,

    /// Host header value, possibly including a port.
    pub host: Option<String>,

    /// Server name, the host without any port.
    pub server_name: Option<String>,

    /// Server port as a string.
    pub server_port: Option<String>,

    /// Path prefix the application is mounted under.
    pub path_prefix: Option<String>,
}

/// Snapshot of the transport metadata before any forwarded header was
/// applied. Inserted into request extensions alongside the resolved
/// metadata so consumers can recover the pre-resolution values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedOrig(pub ForwardedMetadata);

/// Select the trusted value from a comma-separated header chain.
///
/// Returns `None` when the kind is untrusted (`trusted == 0`), the
/// header is absent or empty, or the chain holds fewer values than the
/// trust count.
pub fn trusted_value(trusted: usize, value: Option<&str>) -> Option<String> {
    if trusted == 0 {
        return None;
    }
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    let values: Vec<&str> = value.split(',').map(str::trim).collect();
    if values.len() >= trusted {
        Some(values[values.len() - trusted].to_string())
    } else {
        None
    }
}

/// A host value carries a splittable port when it contains a colon and
/// is not a bare bracketed IPv6 literal.
fn split_host_port(host: &str) -> Option<(&str, &str)> {
    if host.contains(':') && !host.ends_with(']') {
        host.rsplit_once(':')
    } else {
        None
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Apply the forwarded headers to a copy of the transport metadata.
///
/// Header kinds are processed in a fixed order: For, Original-For,
/// Proto, Host, Port, Prefix. Returns the resolved metadata and a
/// snapshot of the original values. With all trust counts at zero this
/// is the identity transform.
pub fn resolve(
    trust: &TrustedProxies,
    metadata: ForwardedMetadata,
    headers: &HeaderMap,
) -> (ForwardedMetadata, ForwardedOrig) {
    let orig = ForwardedOrig(metadata.clone());
    let mut metadata = metadata;

    if let Some(x_for) = trusted_value(trust.x_for, header_str(headers, "x-forwarded-for")) {
        metadata.remote_addr = Some(x_for);
    }

    // Checked strictly after X-Forwarded-For so it always wins when
    // both are configured and present.
    if let Some(x_original_for) = trusted_value(
        trust.x_original_for,
        header_str(headers, "x-original-forwarded-for"),
    ) {
        metadata.remote_addr = Some(x_original_for);
    }

    if let Some(x_proto) = trusted_value(trust.x_proto, header_str(headers, "x-forwarded-proto")) {
        metadata.scheme = Some(x_proto);
    }

    if let Some(x_host) = trusted_value(trust.x_host, header_str(headers, "x-forwarded-host")) {
        metadata.host = Some(x_host.clone());
        metadata.server_name = Some(x_host.clone());
        if let Some((name, port)) = split_host_port(&x_host) {
            metadata.server_name = Some(name.to_string());
            metadata.server_port = Some(port.to_string());
        }
    }

    if let Some(x_port) = trusted_value(trust.x_port, header_str(headers, "x-forwarded-port")) {
        if let Some(host) = metadata.host.take() {
            let bare = match split_host_port(&host) {
                Some((name, _)) => name.to_string(),
                None => host,
            };
            metadata.host = Some(format!("{bare}:{x_port}"));
        }
        metadata.server_port = Some(x_port);
    }

    if let Some(x_prefix) = trusted_value(trust.x_prefix, header_str(headers, "x-forwarded-prefix"))
    {
        metadata.path_prefix = Some(x_prefix);
    }

    (metadata, orig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn base_metadata() -> ForwardedMetadata {
        ForwardedMetadata {
            remote_addr: Some("10.0.0.1".into()),
            scheme: Some("http".into()),
            host: Some("internal:8080".into()),
            server_name: Some("internal".into()),
            server_port: Some("8080".into()),
            path_prefix: None,
        }
    }

    #[test]
    fn test_zero_trust_is_identity() {
        let headers = headers(&[
            ("x-forwarded-for", "1.1.1.1"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "evil.example.com"),
            ("x-forwarded-port", "443"),
            ("x-forwarded-prefix", "/evil"),
        ]);
        let metadata = base_metadata();
        let (resolved, orig) = resolve(&TrustedProxies::none(), metadata.clone(), &headers);
        assert_eq!(resolved, metadata);
        assert_eq!(orig.0, metadata);
    }

    #[test]
    fn test_for_selects_from_the_right() {
        let headers = headers(&[("x-forwarded-for", "1.1.1.1, 2.2.2.2, 3.3.3.3")]);
        let trust = TrustedProxies {
            x_for: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.remote_addr.as_deref(), Some("3.3.3.3"));

        let trust = TrustedProxies {
            x_for: 2,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.remote_addr.as_deref(), Some("2.2.2.2"));
    }

    #[test]
    fn test_short_chain_never_trusted() {
        let headers = headers(&[("x-forwarded-for", "1.1.1.1, 2.2.2.2")]);
        let trust = TrustedProxies {
            x_for: 3,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.remote_addr.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_original_for_overrides_for() {
        let headers = headers(&[
            ("x-forwarded-for", "1.1.1.1, 2.2.2.2"),
            ("x-original-forwarded-for", "9.9.9.9"),
        ]);
        let trust = TrustedProxies {
            x_for: 1,
            x_original_for: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.remote_addr.as_deref(), Some("9.9.9.9"));
    }

    #[test]
    fn test_original_for_absent_falls_back_to_for() {
        let headers = headers(&[("x-forwarded-for", "1.1.1.1")]);
        let trust = TrustedProxies {
            x_for: 1,
            x_original_for: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.remote_addr.as_deref(), Some("1.1.1.1"));
    }

    #[test]
    fn test_proto_sets_scheme_verbatim() {
        let headers = headers(&[("x-forwarded-proto", "https")]);
        let trust = TrustedProxies {
            x_proto: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.scheme.as_deref(), Some("https"));
    }

    #[test]
    fn test_host_with_port_splits() {
        let headers = headers(&[("x-forwarded-host", "example.com:9000")]);
        let trust = TrustedProxies {
            x_host: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.host.as_deref(), Some("example.com:9000"));
        assert_eq!(resolved.server_name.as_deref(), Some("example.com"));
        assert_eq!(resolved.server_port.as_deref(), Some("9000"));
    }

    #[test]
    fn test_host_without_port_keeps_server_port() {
        let headers = headers(&[("x-forwarded-host", "example.com")]);
        let trust = TrustedProxies {
            x_host: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.host.as_deref(), Some("example.com"));
        assert_eq!(resolved.server_name.as_deref(), Some("example.com"));
        assert_eq!(resolved.server_port.as_deref(), Some("8080"));
    }

    #[test]
    fn test_ipv6_host_is_not_split() {
        let headers = headers(&[("x-forwarded-host", "[2001:db8::1]")]);
        let trust = TrustedProxies {
            x_host: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.host.as_deref(), Some("[2001:db8::1]"));
        assert_eq!(resolved.server_name.as_deref(), Some("[2001:db8::1]"));
        assert_eq!(resolved.server_port.as_deref(), Some("8080"));
    }

    #[test]
    fn test_port_replaces_existing_host_port() {
        let headers = headers(&[("x-forwarded-port", "443")]);
        let trust = TrustedProxies {
            x_port: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.host.as_deref(), Some("internal:443"));
        assert_eq!(resolved.server_port.as_deref(), Some("443"));
    }

    #[test]
    fn test_port_without_host_sets_server_port_only() {
        let headers = headers(&[("x-forwarded-port", "443")]);
        let trust = TrustedProxies {
            x_port: 1,
            ..TrustedProxies::none()
        };
        let metadata = ForwardedMetadata::default();
        let (resolved, _) = resolve(&trust, metadata, &headers);
        assert_eq!(resolved.host, None);
        assert_eq!(resolved.server_port.as_deref(), Some("443"));
    }

    #[test]
    fn test_prefix_sets_path_prefix() {
        let headers = headers(&[("x-forwarded-prefix", "/docs")]);
        let trust = TrustedProxies {
            x_prefix: 1,
            ..TrustedProxies::none()
        };
        let (resolved, _) = resolve(&trust, base_metadata(), &headers);
        assert_eq!(resolved.path_prefix.as_deref(), Some("/docs"));
    }

    #[test]
    fn test_orig_snapshot_preserved() {
        let headers = headers(&[
            ("x-forwarded-for", "1.1.1.1"),
            ("x-forwarded-proto", "https"),
        ]);
        let metadata = base_metadata();
        let (resolved, orig) = resolve(&TrustedProxies::default(), metadata.clone(), &headers);
        assert_eq!(orig.0, metadata);
        assert_eq!(resolved.remote_addr.as_deref(), Some("1.1.1.1"));
        assert_eq!(resolved.scheme.as_deref(), Some("https"));
    }

    #[test]
    fn test_trusted_value_edge_cases() {
        assert_eq!(trusted_value(0, Some("1.1.1.1")), None);
        assert_eq!(trusted_value(1, None), None);
        assert_eq!(trusted_value(1, Some("")), None);
        assert_eq!(trusted_value(1, Some("  a , b ")), Some("b".into()));
        assert_eq!(trusted_value(2, Some("a, b")), Some("a".into()));
        assert_eq!(trusted_value(3, Some("a, b")), None);
    }
}
