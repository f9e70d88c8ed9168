//! Request execution with diagnostic scopes.
//!
//! Opens the request-level scope before handing the request to the schema
//! and holds it for the whole call. If the caller drops the future (client
//! gone, timeout), the guard is dropped with it and the scope still closes.

use std::sync::Arc;

use async_graphql::{Request, Response};

use crate::diagnostics::{DiagnosticEvents, RequestInfo};
use crate::graphql::schema::{build_schema, AppSchema};

/// Executes GraphQL requests against the application schema.
#[derive(Clone)]
pub struct GraphQlExecutor {
    schema: AppSchema,
    events: Arc<DiagnosticEvents>,
}

impl GraphQlExecutor {
    pub fn new(events: DiagnosticEvents) -> Self {
        let events = Arc::new(events);
        Self {
            schema: build_schema(events.clone()),
            events,
        }
    }

    /// Execute a request, correlating diagnostics with `query_id`.
    pub async fn execute(&self, query_id: Option<String>, request: impl Into<Request>) -> Response {
        let request = request.into();

        let mut scope = self.events.execute_request(&RequestInfo {
            query_id: query_id.as_deref(),
            query: Some(request.query.as_str()).filter(|q| !q.is_empty()),
            operation_name: request.operation_name.as_deref(),
        });

        let response = self.schema.execute(request).await;

        for error in &response.errors {
            self.events.request_error(query_id.as_deref(), &error.message);
        }

        scope.release();
        response
    }
}

impl std::fmt::Debug for GraphQlExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlExecutor")
            .field("events", &self.events)
            .finish()
    }
}
