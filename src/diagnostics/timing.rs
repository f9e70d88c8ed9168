//! Request timing observer.
//!
//! Logs each request's start, its query text at debug level, and the wall
//! clock time until its scope is released:
//!
//! ```text
//! INFO  New query 3f0c...
//! DEBUG 3f0c...: { test }
//! INFO  Query 3f0c... executed in 4ms
//! ```
//!
//! Every scope carries its own start instant, so concurrent requests never
//! share timing state.

use std::time::{Duration, Instant};

use crate::diagnostics::listener::{
    ActivityGuard, ActivityScope, DiagnosticEventListener, RequestInfo,
};
use crate::observability::metrics;

/// Listener that times each GraphQL request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTimingObserver;

impl RequestTimingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticEventListener for RequestTimingObserver {
    fn execute_request(&self, request: &RequestInfo<'_>) -> ActivityGuard {
        ActivityGuard::new(QueryTimingScope::start(request.query_id, request.query))
    }
}

/// Open timing span for a single request.
///
/// Released once, either explicitly or on drop.
#[derive(Debug)]
pub struct QueryTimingScope {
    query_id: Option<String>,
    started: Instant,
    elapsed: Option<Duration>,
}

impl QueryTimingScope {
    /// Log the request start and begin measuring.
    pub fn start(query_id: Option<&str>, query: Option<&str>) -> Self {
        let id = query_id.unwrap_or_default();
        tracing::info!("New query {}", id);
        if let Some(query) = query {
            tracing::debug!("{}: {}", id, query);
        }

        Self {
            query_id: query_id.map(str::to_owned),
            started: Instant::now(),
            elapsed: None,
        }
    }

    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    pub fn is_released(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Measured duration, once released.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Stop the measurement and log it. No-op after the first call.
    pub fn release(&mut self) {
        if self.elapsed.is_some() {
            return;
        }

        let elapsed = self.started.elapsed();
        self.elapsed = Some(elapsed);

        tracing::info!(
            "Query {} executed in {}ms",
            self.query_id.as_deref().unwrap_or_default(),
            elapsed.as_millis()
        );
        metrics::record_query(elapsed);
    }
}

impl ActivityScope for QueryTimingScope {
    fn release(&mut self) {
        QueryTimingScope::release(self);
    }
}

impl Drop for QueryTimingScope {
    fn drop(&mut self) {
        self.release();
    }
}
