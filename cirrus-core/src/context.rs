//! Per-call context for remote calls.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

static CALL_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_call_id() -> u64 {
    CALL_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Trace identifier, sent as 32 lower-case hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Generate an identifier from the wall clock and the call counter.
    ///
    /// On wasm32 the clock is not readable and only the counter is used.
    #[must_use]
    pub fn generate() -> Self {
        Self((u128::from(clock_nanos()) << 64) | u128::from(next_call_id()))
    }

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn from_u128(raw: u128) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_nanos() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    u64::try_from(nanos).unwrap_or(u64::MAX)
}

#[cfg(target_arch = "wasm32")]
fn clock_nanos() -> u64 {
    0
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Extra headers sent with a call, ordered by name.
pub type Metadata = BTreeMap<String, String>;

/// Context carried by every remote call issued through a stub.
///
/// Interceptors adjust it before the request goes out. `metadata` entries
/// are sent as HTTP headers and `deadline` becomes the per-request timeout
/// on native targets.
#[derive(Debug, Clone)]
pub struct Context {
    /// Process-unique call number.
    pub request_id: u64,

    /// Point after which the call is abandoned.
    pub deadline: Option<Instant>,

    /// Headers to send.
    pub metadata: Metadata,

    /// Trace identifier, set by the tracing interceptor when absent.
    pub trace_id: Option<TraceId>,
}

impl Context {
    /// Context for a new call with no deadline and no headers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: next_call_id(),
            deadline: None,
            metadata: Metadata::new(),
            trace_id: None,
        }
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Add or replace a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(name.into(), value.into());
    }

    /// Value of a header set on this call.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }

    /// Headers in name order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The trace identifier, generated on first use.
    pub fn trace_id_or_generate(&mut self) -> TraceId {
        *self.trace_id.get_or_insert_with(TraceId::generate)
    }

    /// Time left before the deadline; `None` without a deadline or once it passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .and_then(|d| d.checked_duration_since(Instant::now()))
    }

    /// Check if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_ids_are_unique() {
        let first = Context::new();
        let second = Context::new();
        assert!(first.request_id > 0);
        assert_ne!(first.request_id, second.request_id);
        assert!(first.deadline.is_none());
    }

    #[test]
    fn test_context_timeout() {
        let ctx = Context::new().with_timeout(Duration::from_secs(10));
        assert!(!ctx.is_expired());
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(10));

        let past = Context::new().with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(past.is_expired());
        assert!(past.remaining().is_none());
    }

    #[test]
    fn test_context_headers() {
        let mut ctx = Context::new()
            .with_header("x-tenant", "acme")
            .with_header("accept-language", "en");
        ctx.set_header("x-tenant", "globex");

        assert_eq!(ctx.header("x-tenant"), Some("globex"));
        assert_eq!(ctx.header("nonexistent"), None);
        let names: Vec<&str> = ctx.headers().map(|(k, _)| k).collect();
        assert_eq!(names, ["accept-language", "x-tenant"]);
    }

    #[test]
    fn test_trace_id() {
        let trace_id = TraceId::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(trace_id.to_string(), "0123456789abcdef0123456789abcdef");
        assert_eq!(TraceId::from_u128(7).to_string().len(), 32);

        let mut ctx = Context::new();
        let generated = ctx.trace_id_or_generate();
        assert_eq!(ctx.trace_id_or_generate(), generated);
        assert_ne!(TraceId::generate(), TraceId::generate());
        assert_ne!(TraceId::generate().as_u128() >> 64, 0);
    }
}
