//! Metric label sets.

use std::slice;

/// An ordered set of key/value string tags attached to a sample.
///
/// Order is preserved so encoded lines are deterministic. Every
/// distinct combination partitions the aggregated series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Labels(Vec<(String, String)>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// The standard request label set: `{view, method, status}`.
    pub fn request(view: &str, method: &str, status: u16) -> Self {
        Self::new()
            .with("view", view)
            .with("method", method)
            .with("status", status.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, (String, String)> {
        self.0.iter()
    }
}
