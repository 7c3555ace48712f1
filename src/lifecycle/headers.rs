//! Default security response headers.
//!
//! # Design Decisions
//! - `X-Frame-Options` is only filled in when the handler did not set
//!   its own value; the others are always enforced

use axum::http::{header, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Deny cross-origin framing unless the handler opted into something
/// else.
pub fn frame_options() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    )
}

/// Forbid MIME sniffing on every response.
pub fn content_type_options() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("NOSNIFF"),
    )
}

/// Opt out of interest-cohort tracking.
pub fn permissions_policy() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("interest-cohort=()"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/framed",
                get(|| async {
                    ([(header::X_FRAME_OPTIONS, "ALLOWALL")], "embed me")
                }),
            )
            .layer(frame_options())
            .layer(content_type_options())
            .layer(permissions_policy())
    }

    async fn get_headers(path: &str) -> axum::http::HeaderMap {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response.headers().clone()
    }

    #[tokio::test]
    async fn test_defaults_set() {
        let headers = get_headers("/").await;
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "NOSNIFF");
        assert_eq!(headers["permissions-policy"], "interest-cohort=()");
    }

    #[tokio::test]
    async fn test_handler_frame_options_wins() {
        let headers = get_headers("/framed").await;
        assert_eq!(headers[header::X_FRAME_OPTIONS], "ALLOWALL");
    }
}
