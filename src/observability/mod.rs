//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! diagnostics::timing (request start/end)
//!     → tracing macros → logging.rs subscriber (stdout, text or JSON)
//!     → metrics.rs (counter + latency histogram)
//!
//! Consumers:
//!     → Console / log aggregation
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
