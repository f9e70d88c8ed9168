//! GraphQL schema definition.

use std::sync::Arc;

use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};

use crate::diagnostics::{DiagnosticEvents, DiagnosticsExtension};

pub type AppSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Root query type.
#[derive(Debug, Default)]
pub struct Query;

#[Object]
impl Query {
    async fn test(&self) -> &'static str {
        "Luke SkyWalker"
    }
}

/// Build the schema with the diagnostics extension attached.
pub fn build_schema(events: Arc<DiagnosticEvents>) -> AppSchema {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(DiagnosticsExtension::new(events))
        .finish()
}
