//! Tower layer applying forwarded-header resolution.
//!
//! # Responsibilities
//! - Build per-request transport metadata from the connection and request
//! - Run the resolver before any other middleware sees the request
//! - Rewrite the `Host` header when a trusted `X-Forwarded-Host`/`-Port` applies
//! - Expose resolved and original metadata through request extensions
//!
//! # Design Decisions
//! - Applied outermost, the axum equivalent of wrapping the WSGI app
//! - Resolution is synchronous; the inner service future is returned as-is

use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderValue, Request};
use tower::{Layer, Service};

use crate::proxy::forwarded::{resolve, ForwardedMetadata, TrustedProxies};

/// Layer that rewrites transport metadata from `X-Forwarded-*` headers.
///
/// ```ignore
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(ProxyFixLayer::new(TrustedProxies::default()));
/// ```
#[derive(Debug, Clone)]
pub struct ProxyFixLayer {
    trust: Arc<TrustedProxies>,
}

impl ProxyFixLayer {
    pub fn new(trust: TrustedProxies) -> Self {
        Self {
            trust: Arc::new(trust),
        }
    }
}

impl<S> Layer<S> for ProxyFixLayer {
    type Service = ProxyFix<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ProxyFix {
            inner,
            trust: self.trust.clone(),
        }
    }
}

/// Middleware service produced by [`ProxyFixLayer`].
#[derive(Debug, Clone)]
pub struct ProxyFix<S> {
    inner: S,
    trust: Arc<TrustedProxies>,
}

impl<S, B> Service<Request<B>> for ProxyFix<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let metadata = metadata_from_request(&req);
        let (resolved, orig) = resolve(&self.trust, metadata, req.headers());

        // Keep the Host header in sync so downstream absolute-URL
        // construction uses the client-facing host.
        if resolved.host != orig.0.host {
            match &resolved.host {
                Some(host) => {
                    if let Ok(value) = HeaderValue::from_str(host) {
                        req.headers_mut().insert(header::HOST, value);
                    }
                }
                None => {
                    req.headers_mut().remove(header::HOST);
                }
            }
        }

        req.extensions_mut().insert(resolved);
        req.extensions_mut().insert(orig);
        self.inner.call(req)
    }
}

/// Assemble the untouched transport metadata for one request.
///
/// The peer address comes from [`ConnectInfo`] when the server was
/// started with connect-info support; server name and port are derived
/// from the `Host` header the same way a WSGI server would populate
/// `SERVER_NAME`/`SERVER_PORT`.
fn metadata_from_request<B>(req: &Request<B>) -> ForwardedMetadata {
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (server_name, server_port) = match &host {
        Some(host) if host.contains(':') && !host.ends_with(']') => match host.rsplit_once(':') {
            Some((name, port)) => (Some(name.to_string()), Some(port.to_string())),
            None => (Some(host.clone()), None),
        },
        Some(host) => (Some(host.clone()), None),
        None => (None, None),
    };

    ForwardedMetadata {
        remote_addr,
        scheme: Some(req.uri().scheme_str().unwrap_or("http").to_string()),
        host,
        server_name,
        server_port,
        path_prefix: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::forwarded::ForwardedOrig;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::ServiceExt;

    async fn run_through(
        trust: TrustedProxies,
        req: Request<Body>,
    ) -> (Option<ForwardedMetadata>, Option<ForwardedOrig>) {
        let service = ProxyFixLayer::new(trust).layer(tower::service_fn(
            |req: Request<Body>| async move {
                Ok::<_, Infallible>((
                    req.extensions().get::<ForwardedMetadata>().cloned(),
                    req.extensions().get::<ForwardedOrig>().cloned(),
                ))
            },
        ));
        service.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_resolved_metadata_in_extensions() {
        let mut req = Request::builder()
            .uri("/index")
            .header("host", "internal:8080")
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("10.0.0.1:51234".parse().unwrap()));

        let (resolved, orig) = run_through(TrustedProxies::default(), req).await;
        let resolved = resolved.unwrap();
        assert_eq!(resolved.remote_addr.as_deref(), Some("203.0.113.7"));
        assert_eq!(resolved.scheme.as_deref(), Some("https"));
        assert_eq!(resolved.host.as_deref(), Some("internal:8080"));

        let orig = orig.unwrap().0;
        assert_eq!(orig.remote_addr.as_deref(), Some("10.0.0.1"));
        assert_eq!(orig.scheme.as_deref(), Some("http"));
        assert_eq!(orig.server_name.as_deref(), Some("internal"));
        assert_eq!(orig.server_port.as_deref(), Some("8080"));
    }

    #[tokio::test]
    async fn test_host_header_rewritten_when_trusted() {
        let req = Request::builder()
            .uri("/")
            .header("host", "internal:8080")
            .header("x-forwarded-host", "example.com")
            .body(Body::empty())
            .unwrap();

        let trust = TrustedProxies {
            x_host: 1,
            ..TrustedProxies::none()
        };
        let service = ProxyFixLayer::new(trust).layer(tower::service_fn(
            |req: Request<Body>| async move {
                Ok::<_, Infallible>(
                    req.headers()
                        .get(header::HOST)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                )
            },
        ));
        let host = service.oneshot(req).await.unwrap();
        assert_eq!(host.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_untrusted_request_keeps_peer_address() {
        let mut req = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("10.0.0.1:51234".parse().unwrap()));

        let (resolved, _) = run_through(TrustedProxies::none(), req).await;
        assert_eq!(resolved.unwrap().remote_addr.as_deref(), Some("10.0.0.1"));
    }
}
