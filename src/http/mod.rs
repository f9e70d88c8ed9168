//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign / echo x-request-id)
//!     → graphql::GraphQlExecutor (POST /graphql)
//!     → response with x-request-id header
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
