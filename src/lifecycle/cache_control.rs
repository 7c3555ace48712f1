//! Default cache-control response shaping.
//!
//! # Responsibilities
//! - Apply conservative default caching directives to successful
//!   responses that carry no caching policy of their own
//! - Force status endpoints to stay uncached
//!
//! # Design Decisions
//! - The defaults are skipped entirely whenever the handler already set
//!   `no-store`, `no-cache`, or `private`; an explicit policy always
//!   wins over the defaults
//! - Individual directives are only added when absent, so a handler
//!   that set only `max-age` still gets the stale-serving defaults

use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

/// Short hard-cache so content can be refreshed quickly after a release.
const DEFAULT_MAX_AGE: &str = "max-age=60";

/// Serve stale content while refreshing in the background, up to a day.
const DEFAULT_STALE_WHILE_REVALIDATE: &str = "stale-while-revalidate=86400";

/// Serve stale content over transitory backend errors, up to 5 minutes.
const DEFAULT_STALE_IF_ERROR: &str = "stale-if-error=300";

/// Status endpoints must report fresh information at all times.
const UNCACHED_PREFIX: &str = "/_status";

fn has_directive(value: &str, name: &str) -> bool {
    value.split(',').any(|directive| {
        directive
            .trim()
            .split('=')
            .next()
            .unwrap_or("")
            .trim()
            .eq_ignore_ascii_case(name)
    })
}

fn append_directive(value: &mut String, directive: &str) {
    if !value.is_empty() {
        value.push_str(", ");
    }
    value.push_str(directive);
}

/// Middleware applying the default caching rules, for
/// `axum::middleware::from_fn`.
pub async fn apply_cache_defaults(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let current = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let updated = if path.starts_with(UNCACHED_PREFIX) {
        let mut value = current;
        if !has_directive(&value, "no-store") {
            append_directive(&mut value, "no-store");
        }
        Some(value)
    } else if response.status() == StatusCode::OK
        && !has_directive(&current, "no-store")
        && !has_directive(&current, "no-cache")
        && !has_directive(&current, "private")
    {
        let mut value = current;
        if !has_directive(&value, "max-age") {
            append_directive(&mut value, DEFAULT_MAX_AGE);
        }
        if !has_directive(&value, "stale-while-revalidate") {
            append_directive(&mut value, DEFAULT_STALE_WHILE_REVALIDATE);
        }
        if !has_directive(&value, "stale-if-error") {
            append_directive(&mut value, DEFAULT_STALE_IF_ERROR);
        }
        Some(value)
    } else {
        None
    };

    if let Some(updated) = updated {
        if let Ok(value) = HeaderValue::from_str(&updated) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }

    response
}
