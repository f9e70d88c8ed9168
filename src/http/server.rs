//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the GraphQL and health handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{FromRequest, RawQuery, Request, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::diagnostics::{DiagnosticEvents, RequestTimingObserver};
use crate::graphql::GraphQlExecutor;
use crate::http::request;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: GraphQlExecutor,
    pub graphql_path: Arc<str>,
    pub ide_enabled: bool,
}

/// HTTP server exposing the GraphQL endpoint.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server that logs request timings.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_events(config, DiagnosticEvents::new().with_listener(RequestTimingObserver))
    }

    /// Create a server with a custom set of diagnostic listeners.
    pub fn with_events(config: ServiceConfig, events: DiagnosticEvents) -> Self {
        let state = AppState {
            executor: GraphQlExecutor::new(events),
            graphql_path: Arc::from(config.graphql.path.as_str()),
            ide_enabled: config.graphql.ide_enabled,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.graphql.path, get(graphql_get).post(graphql_handler))
            .route("/health", get(health))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(request::propagate_request_id_layer())
            .layer(request::set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.graphql.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for embedding in a larger application.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let query_id = request::request_id(&headers);
    state.executor.execute(query_id, req.into_inner()).await.into()
}

/// GET with a `query` parameter executes it; a bare GET serves the IDE.
async fn graphql_get(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    req: Request,
) -> Response {
    if raw.as_deref().is_some_and(has_query_param) {
        let query_id = request::request_id(req.headers());
        return match <GraphQLRequest>::from_request(req, &state).await {
            Ok(gql) => {
                let response = state.executor.execute(query_id, gql.into_inner()).await;
                GraphQLResponse::from(response).into_response()
            }
            Err(rejection) => rejection.into_response(),
        };
    }

    if state.ide_enabled {
        Html(GraphiQLSource::build().endpoint(&state.graphql_path).finish()).into_response()
    } else {
        (StatusCode::BAD_REQUEST, "missing `query` parameter").into_response()
    }
}

fn has_query_param(raw: &str) -> bool {
    raw.split('&').any(|pair| pair.split('=').next() == Some("query"))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
