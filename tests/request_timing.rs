//! Request timing observer: log lines, idempotence, and scope lifetimes.

use std::time::Duration;

use graphql_diag::diagnostics::{
    DiagnosticEvents, QueryTimingScope, RequestInfo, RequestTimingObserver,
};
use graphql_diag::graphql::GraphQlExecutor;
use tracing::Level;

mod common;

use common::LogCapture;

fn timing_events() -> DiagnosticEvents {
    DiagnosticEvents::new().with_listener(RequestTimingObserver)
}

#[tokio::test]
async fn logs_start_query_text_and_duration() {
    let (logs, _guard) = LogCapture::install();

    let mut scope = QueryTimingScope::start(Some("q1"), Some("{ test }"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    scope.release();

    assert_eq!(logs.at(Level::INFO)[0], "New query q1");
    assert_eq!(logs.at(Level::DEBUG), ["q1: { test }"]);

    let ms = logs.elapsed_for("q1");
    assert!((50..1000).contains(&ms), "elapsed {ms}ms");
}

#[tokio::test]
async fn absent_id_and_query_do_not_break_logging() {
    let (logs, _guard) = LogCapture::install();

    let mut scope = QueryTimingScope::start(None, None);
    scope.release();

    assert_eq!(logs.count("New query "), 1);
    assert!(logs.at(Level::DEBUG).is_empty());
    let executions = logs.executions();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].0, "");
}

#[tokio::test]
async fn second_release_logs_nothing() {
    let (logs, _guard) = LogCapture::install();

    let mut scope = QueryTimingScope::start(Some("twice"), None);
    scope.release();
    scope.release();
    drop(scope);

    assert_eq!(logs.executions().len(), 1);
}

#[tokio::test]
async fn drop_releases_the_scope() {
    let (logs, _guard) = LogCapture::install();

    {
        let _scope = QueryTimingScope::start(Some("dropped"), None);
    }

    assert_eq!(logs.count("New query dropped"), 1);
    logs.elapsed_for("dropped");
}

#[tokio::test]
async fn start_line_precedes_end_line() {
    let (logs, _guard) = LogCapture::install();
    let executor = GraphQlExecutor::new(timing_events());

    for id in ["a", "b", "c"] {
        executor.execute(Some(id.to_string()), "{ test }").await;
    }

    for id in ["a", "b", "c"] {
        let start = logs.position(&format!("New query {id}")).unwrap();
        let end = logs
            .messages()
            .iter()
            .position(|m| m.starts_with(&format!("Query {id} executed in ")))
            .unwrap();
        assert!(start < end, "{id}: start at {start}, end at {end}");
        assert_eq!(logs.count(&format!("New query {id}")), 1);
    }
    assert_eq!(logs.executions().len(), 3);
}

#[tokio::test]
async fn concurrent_scopes_measure_independently() {
    let (logs, _guard) = LogCapture::install();
    let events = timing_events();

    let mut first = events.execute_request(&RequestInfo {
        query_id: Some("first"),
        query: Some("{ test }"),
        operation_name: None,
    });
    tokio::time::sleep(Duration::from_millis(40)).await;

    let mut second = events.execute_request(&RequestInfo {
        query_id: Some("second"),
        query: Some("{ test }"),
        operation_name: None,
    });
    tokio::time::sleep(Duration::from_millis(40)).await;

    second.release();
    tokio::time::sleep(Duration::from_millis(20)).await;
    first.release();

    let first_ms = logs.elapsed_for("first");
    let second_ms = logs.elapsed_for("second");
    assert!(second_ms >= 40, "second took {second_ms}ms");
    assert!(first_ms >= 100, "first took {first_ms}ms");
    assert!(first_ms >= second_ms + 59, "first {first_ms}ms, second {second_ms}ms");
}

#[tokio::test]
async fn concurrent_executions_each_log_once() {
    let (logs, _guard) = LogCapture::install();
    let executor = GraphQlExecutor::new(timing_events());

    let (a, b) = tokio::join!(
        executor.execute(Some("left".into()), "{ test }"),
        executor.execute(Some("right".into()), "{ test }"),
    );
    assert!(a.errors.is_empty());
    assert!(b.errors.is_empty());

    logs.elapsed_for("left");
    logs.elapsed_for("right");
}

#[tokio::test]
async fn failed_request_still_logs_duration_once() {
    let (logs, _guard) = LogCapture::install();
    let executor = GraphQlExecutor::new(timing_events());

    let response = executor.execute(Some("bad".into()), "{ doesNotExist }").await;
    assert!(!response.errors.is_empty());

    assert_eq!(logs.count("New query bad"), 1);
    logs.elapsed_for("bad");
}

#[tokio::test]
async fn syntax_error_still_logs_duration_once() {
    let (logs, _guard) = LogCapture::install();
    let executor = GraphQlExecutor::new(timing_events());

    let response = executor.execute(Some("broken".into()), "{ test").await;
    assert!(!response.errors.is_empty());

    logs.elapsed_for("broken");
}

#[tokio::test]
async fn cancelled_request_still_logs_duration_once() {
    let (logs, _guard) = LogCapture::install();
    let events = timing_events();

    let work = async {
        let _scope = events.execute_request(&RequestInfo {
            query_id: Some("cancelled"),
            query: None,
            operation_name: None,
        });
        tokio::time::sleep(Duration::from_secs(10)).await;
    };
    let outcome = tokio::time::timeout(Duration::from_millis(30), work).await;
    assert!(outcome.is_err());

    let ms = logs.elapsed_for("cancelled");
    assert!(ms >= 20, "elapsed {ms}ms");
}

#[tokio::test]
async fn executor_logs_query_text_at_debug() {
    let (logs, _guard) = LogCapture::install();
    let executor = GraphQlExecutor::new(timing_events());

    executor.execute(Some("dbg".into()), "query Named { test }").await;

    assert_eq!(logs.at(Level::DEBUG), ["dbg: query Named { test }"]);
}
