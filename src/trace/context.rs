//! W3C trace-context parsing.
//!
//! # Responsibilities
//! - Parse the `traceparent` request header
//! - Render 128-bit trace ids as 32 lowercase hex characters
//!
//! # Design Decisions
//! - Malformed input yields `None`, never an error; a garbled header
//!   must not break request handling
//! - All-zero trace or span ids are rejected as invalid per the spec

use std::fmt;

/// A 128-bit trace identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Parse exactly 32 lowercase-insensitive hex characters. The
    /// all-zero id is the W3C invalid sentinel and is rejected.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u128::from_str_radix(s, 16).ok()?;
        if value == 0 {
            return None;
        }
        Some(Self(value))
    }

    /// Render as 32 lowercase hex characters.
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// A parsed `traceparent` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: TraceId,
    pub parent_id: u64,
    pub flags: u8,
}

impl TraceContext {
    /// Parse a W3C `traceparent` header value:
    /// `version-traceid-parentid-flags`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let mut fields = value.splitn(4, '-');

        let version = fields.next()?;
        if version.len() != 2 || !version.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        // 0xff is forbidden by the spec.
        if version.eq_ignore_ascii_case("ff") {
            return None;
        }

        let trace_id = TraceId::from_hex(fields.next()?)?;

        let parent = fields.next()?;
        if parent.len() != 16 || !parent.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let parent_id = u64::from_str_radix(parent, 16).ok()?;
        if parent_id == 0 {
            return None;
        }

        let rest = fields.next()?;
        // Version 00 has exactly four fields; later versions may append
        // more, which we ignore.
        let flags_part = match rest.split_once('-') {
            Some((flags, _)) if version != "00" => flags,
            Some(_) => return None,
            None => rest,
        };
        if flags_part.len() != 2 || !flags_part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let flags = u8::from_str_radix(flags_part, 16).ok()?;

        Some(Self {
            trace_id,
            parent_id,
            flags,
        })
    }

    /// Render back to a version-00 `traceparent` value.
    pub fn to_traceparent(&self) -> String {
        format!(
            "00-{}-{:016x}-{:02x}",
            self.trace_id, self.parent_id, self.flags
        )
    }
}
