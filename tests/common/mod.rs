//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use graphql_diag::config::ServiceConfig;
use graphql_diag::http::HttpServer;
use graphql_diag::lifecycle::Shutdown;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Records every event emitted by this crate on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, m)| m).collect()
    }

    /// Messages at `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// `(query id, elapsed ms)` for every "executed in" line.
    pub fn executions(&self) -> Vec<(String, u128)> {
        self.messages().iter().filter_map(|m| parse_executed(m)).collect()
    }

    /// Elapsed ms logged for `id`; panics unless logged exactly once.
    pub fn elapsed_for(&self, id: &str) -> u128 {
        let found: Vec<u128> = self
            .executions()
            .into_iter()
            .filter(|(qid, _)| qid == id)
            .map(|(_, ms)| ms)
            .collect();
        assert_eq!(found.len(), 1, "expected one execution line for {id:?}, got {found:?}");
        found[0]
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| *m == message).count()
    }

    pub fn position(&self, message: &str) -> Option<usize> {
        self.messages().iter().position(|m| m == message)
    }
}

/// Parse `Query {id} executed in {ms}ms`.
pub fn parse_executed(message: &str) -> Option<(String, u128)> {
    let rest = message.strip_prefix("Query ")?;
    let (id, ms) = rest.rsplit_once(" executed in ")?;
    let ms = ms.strip_suffix("ms")?.parse().ok()?;
    Some((id.to_string(), ms))
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("graphql_diag") {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.lines
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server for `config` on 127.0.0.1 with an OS-assigned port.
pub async fn start_server(mut config: ServiceConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
