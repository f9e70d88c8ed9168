//! GraphQL subsystem.
//!
//! # Data Flow
//! ```text
//! http::server (POST /graphql)
//!     → executor.rs (request scope, error reporting)
//!     → schema.rs (async-graphql Schema, diagnostics extension)
//! ```

pub mod executor;
pub mod schema;

pub use executor::GraphQlExecutor;
pub use schema::{build_schema, AppSchema, Query};
