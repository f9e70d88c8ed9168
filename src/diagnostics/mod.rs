//! GraphQL diagnostics subsystem.
//!
//! # Data Flow
//! ```text
//! graphql::executor (request start/end)
//!     → listener.rs (DiagnosticEvents fan-out)
//!     → timing.rs (RequestTimingObserver logs + metrics)
//!
//! async-graphql engine (parse / validate / resolve)
//!     → extension.rs (ExtensionFactory adapter)
//!     → listener.rs
//! ```
//!
//! # Design Decisions
//! - Listeners implement only the hooks they care about
//! - Scopes are RAII guards, released once on every exit path
//! - No shared timer: each request scope owns its start instant

pub mod extension;
pub mod listener;
pub mod timing;

pub use extension::DiagnosticsExtension;
pub use listener::{
    ActivityGuard, ActivityScope, DiagnosticEventListener, DiagnosticEvents, FieldInfo, RequestInfo,
};
pub use timing::{QueryTimingScope, RequestTimingObserver};
