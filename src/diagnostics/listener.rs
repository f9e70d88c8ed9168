//! Diagnostic listener capability interface.
//!
//! # Responsibilities
//! - Define the lifecycle hooks the GraphQL engine reports to
//! - Provide no-op defaults so listeners implement only what they observe
//! - Guarantee each opened scope is released exactly once
//!
//! # Design Decisions
//! - Hooks that span work return an `ActivityGuard`; release happens on drop
//! - Field resolution is opt-in per listener (`enable_resolve_field_value`)

use std::sync::Arc;

/// A span of work opened by a listener hook.
pub trait ActivityScope: Send {
    /// Close the span. Called at most once by `ActivityGuard`.
    fn release(&mut self);
}

/// Owns an `ActivityScope` and releases it exactly once.
///
/// Release happens on the first explicit `release()` call or on drop,
/// whichever comes first, so the scope closes on every exit path.
#[must_use = "dropping the guard releases the scope immediately"]
pub struct ActivityGuard {
    scope: Option<Box<dyn ActivityScope>>,
}

impl ActivityGuard {
    /// Wrap a listener scope.
    pub fn new(scope: impl ActivityScope + 'static) -> Self {
        Self {
            scope: Some(Box::new(scope)),
        }
    }

    /// A guard with nothing to release.
    pub fn empty() -> Self {
        Self { scope: None }
    }

    /// Release the scope. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(mut scope) = self.scope.take() {
            scope.release();
        }
    }

    /// Whether there is still an open scope behind this guard.
    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ActivityGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityGuard")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Fans several guards into one.
struct CompositeScope(Vec<ActivityGuard>);

impl ActivityScope for CompositeScope {
    fn release(&mut self) {
        for guard in &mut self.0 {
            guard.release();
        }
    }
}

/// What a listener sees when a request starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestInfo<'a> {
    /// Correlation id for the request, if the transport supplied one.
    pub query_id: Option<&'a str>,
    /// Raw query text.
    pub query: Option<&'a str>,
    pub operation_name: Option<&'a str>,
}

/// What a listener sees when a field resolves.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo<'a> {
    /// Response path, e.g. `test` or `user.friends.0.name`.
    pub path: &'a str,
    pub parent_type: &'a str,
    pub return_type: &'a str,
}

/// Hooks invoked by the GraphQL engine over a request's lifecycle.
///
/// Every hook defaults to a no-op.
pub trait DiagnosticEventListener: Send + Sync + 'static {
    /// Opt in to `resolve_field_value`. Off by default since it fires per field.
    fn enable_resolve_field_value(&self) -> bool {
        false
    }

    /// Called once when a request starts; the guard is released when it ends.
    fn execute_request(&self, _request: &RequestInfo<'_>) -> ActivityGuard {
        ActivityGuard::empty()
    }

    fn parse_document(&self, _query: &str) -> ActivityGuard {
        ActivityGuard::empty()
    }

    fn validate_document(&self) -> ActivityGuard {
        ActivityGuard::empty()
    }

    fn resolve_field_value(&self, _field: &FieldInfo<'_>) -> ActivityGuard {
        ActivityGuard::empty()
    }

    /// Called for each error carried by a finished response.
    fn request_error(&self, _query_id: Option<&str>, _message: &str) {}
}

/// Registered listeners, fanned out per hook.
#[derive(Clone, Default)]
pub struct DiagnosticEvents {
    listeners: Vec<Arc<dyn DiagnosticEventListener>>,
    resolves_fields: bool,
}

impl DiagnosticEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn with_listener(mut self, listener: impl DiagnosticEventListener) -> Self {
        self.push(Arc::new(listener));
        self
    }

    pub fn push(&mut self, listener: Arc<dyn DiagnosticEventListener>) {
        self.resolves_fields |= listener.enable_resolve_field_value();
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Whether any listener wants field resolution events.
    pub fn resolves_fields(&self) -> bool {
        self.resolves_fields
    }

    pub fn execute_request(&self, request: &RequestInfo<'_>) -> ActivityGuard {
        self.open(|l| l.execute_request(request))
    }

    pub fn parse_document(&self, query: &str) -> ActivityGuard {
        self.open(|l| l.parse_document(query))
    }

    pub fn validate_document(&self) -> ActivityGuard {
        self.open(|l| l.validate_document())
    }

    pub fn resolve_field_value(&self, field: &FieldInfo<'_>) -> ActivityGuard {
        if !self.resolves_fields {
            return ActivityGuard::empty();
        }
        let guards = self
            .listeners
            .iter()
            .filter(|l| l.enable_resolve_field_value())
            .map(|l| l.resolve_field_value(field))
            .collect();
        Self::combine(guards)
    }

    pub fn request_error(&self, query_id: Option<&str>, message: &str) {
        for listener in &self.listeners {
            listener.request_error(query_id, message);
        }
    }

    fn open<F>(&self, hook: F) -> ActivityGuard
    where
        F: Fn(&dyn DiagnosticEventListener) -> ActivityGuard,
    {
        let guards = self.listeners.iter().map(|l| hook(l.as_ref())).collect();
        Self::combine(guards)
    }

    fn combine(guards: Vec<ActivityGuard>) -> ActivityGuard {
        let mut open: Vec<ActivityGuard> =
            guards.into_iter().filter(ActivityGuard::is_open).collect();
        match open.len() {
            0 => ActivityGuard::empty(),
            1 => open.remove(0),
            _ => ActivityGuard::new(CompositeScope(open)),
        }
    }
}

impl std::fmt::Debug for DiagnosticEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticEvents")
            .field("listeners", &self.listeners.len())
            .field("resolves_fields", &self.resolves_fields)
            .finish()
    }
}
