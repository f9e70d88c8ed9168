//! GraphQL diagnostics demo service library.

pub mod config;
pub mod diagnostics;
pub mod graphql;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use diagnostics::{DiagnosticEventListener, DiagnosticEvents, RequestTimingObserver};
pub use graphql::GraphQlExecutor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
