//! Inbound-signal boundary
//!
//! The interceptor never touches a request object directly; it reads one
//! optional string through [`SignalSource`] (or takes the raw value from
//! the caller) and applies the truthy rule here.

/// Supplies the optional rehearsal signal attached to the current
/// request or call, keyed by the configured name.
///
/// Implemented by the embedder over its request abstraction: an HTTP
/// header map, RPC metadata, a message envelope. A source that has no
/// request in scope returns `None`.
pub trait SignalSource {
    /// Value associated with `key`, if present.
    fn value(&self, key: &str) -> Option<String>;
}

/// Whether a signal value activates rehearsal.
///
/// Accepted: case-insensitive `"true"`, or exact `"1"`.
#[inline]
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
