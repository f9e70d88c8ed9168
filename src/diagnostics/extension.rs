//! Bridges async-graphql's extension hooks onto `DiagnosticEvents`.

use std::sync::Arc;

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextParseQuery, NextResolve, NextValidation,
    ResolveInfo,
};
use async_graphql::parser::types::ExecutableDocument;
use async_graphql::{ServerError, ServerResult, ValidationResult, Value, Variables};

use crate::diagnostics::listener::{DiagnosticEvents, FieldInfo};

/// Extension factory registered on the schema; one extension per request.
#[derive(Debug, Clone)]
pub struct DiagnosticsExtension {
    events: Arc<DiagnosticEvents>,
}

impl DiagnosticsExtension {
    pub fn new(events: Arc<DiagnosticEvents>) -> Self {
        Self { events }
    }
}

impl ExtensionFactory for DiagnosticsExtension {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(DiagnosticsExtensionImpl {
            events: self.events.clone(),
        })
    }
}

struct DiagnosticsExtensionImpl {
    events: Arc<DiagnosticEvents>,
}

#[async_trait::async_trait]
impl Extension for DiagnosticsExtensionImpl {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let _scope = self.events.parse_document(query);
        next.run(ctx, query, variables).await
    }

    async fn validation(
        &self,
        ctx: &ExtensionContext<'_>,
        next: NextValidation<'_>,
    ) -> Result<ValidationResult, Vec<ServerError>> {
        let _scope = self.events.validate_document();
        next.run(ctx).await
    }

    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        if !self.events.resolves_fields() {
            return next.run(ctx, info).await;
        }

        let path = info.path_node.to_string();
        let _scope = self.events.resolve_field_value(&FieldInfo {
            path: &path,
            parent_type: info.parent_type,
            return_type: info.return_type,
        });
        next.run(ctx, info).await
    }
}
