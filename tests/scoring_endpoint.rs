//! HTTP-level tests for the scoring server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use scoring_server::config::ServerConfig;
use scoring_server::scoring::{EchoHandler, InvocationParams, Orchestrator, RunError};

mod common;

fn config(timeout_ms: u64) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.scoring.timeout_ms = timeout_ms;
    config
}

#[tokio::test]
async fn test_health_probe() {
    let config = config(1000);
    let orchestrator = Orchestrator::new(config.scoring.clone(), Arc::new(EchoHandler));
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .get(format!("http://{}/", addr))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Healthy");
    shutdown.trigger();
}

#[tokio::test]
async fn test_echo_round_trip() {
    let config = config(1000);
    let orchestrator = Orchestrator::new(config.scoring.clone(), Arc::new(EchoHandler));
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .header("x-request-id", "req-42")
        .body(r#"{"rows": [[1.0, 2.0]]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-request-id"], "req-42");
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "rows": [[1.0, 2.0]] }));
    shutdown.trigger();
}

#[tokio::test]
async fn test_header_passthrough_collapses_case_and_duplicates() {
    let mut config = config(1000);
    config.scoring.support_request_headers = true;
    let orchestrator = Orchestrator::new(config.scoring.clone(), Arc::new(EchoHandler));
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .header("X-Model", "bAr")
        .header("x-model", "raB")
        .body("1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["body"], json!(1));
    assert_eq!(body["headers"]["X-Model"], json!("bAr, raB"));
    shutdown.trigger();
}

#[tokio::test]
async fn test_override_headers_and_body() {
    let config = config(1000);
    let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> {
        Ok(json!({
            "override_headers": { "X-Score-Version": "7", "Content-Type": "text/csv" },
            "override_body": "id,score\n1,0.5",
        }))
    });
    let orchestrator = Orchestrator::new(config.scoring.clone(), handler);
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-score-version"], "7");
    assert_eq!(res.headers()["content-type"], "text/csv");
    assert_eq!(res.text().await.unwrap(), "id,score\n1,0.5");
    shutdown.trigger();
}

#[tokio::test]
async fn test_handler_failure_is_raw_text() {
    let config = config(1000);
    let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> { Err("boom".into()) });
    let orchestrator = Orchestrator::new(config.scoring.clone(), handler);
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.headers()["x-run-function-failed"], "true");
    assert_eq!(res.text().await.unwrap(), "boom");
    shutdown.trigger();
}

#[tokio::test]
async fn test_server_fault_is_structured() {
    let config = config(1000);
    let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> {
        Err(RunError::server(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "model is still loading",
        ))
    });
    let orchestrator = Orchestrator::new(config.scoring.clone(), handler);
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    assert!(res.headers().get("x-run-function-failed").is_none());
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "message": "model is still loading" })
    );
    shutdown.trigger();
}

#[tokio::test]
async fn test_timeout_over_http() {
    let config = config(100);
    let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> {
        std::thread::sleep(Duration::from_millis(1200));
        Ok(Value::Null)
    });
    let (orchestrator, hooks, telemetry) = common::recording_orchestrator(&config, handler);
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let started = Instant::now();
    let res = common::client()
        .post(format!("http://{}/score", addr))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(1000));
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "Scoring timeout after 100 ms");
    assert_eq!(hooks.stops(), 1);
    assert_eq!(telemetry.count(), 1);
    shutdown.trigger();
}

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let config = config(1000);
    let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> {
        panic!("index out of range");
    });
    let orchestrator = Orchestrator::new(config.scoring.clone(), handler);
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "index out of range");

    // The server keeps serving after a handler panic.
    let res = common::client()
        .get(format!("http://{}/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    shutdown.trigger();
}

#[tokio::test]
async fn test_ui_page_served() {
    let path = std::env::temp_dir().join(format!("scoring-ui-{}.html", uuid::Uuid::new_v4()));
    std::fs::write(&path, "<html><body>score me</body></html>").unwrap();

    let mut config = config(1000);
    config.ui.path = path.to_string_lossy().into_owned();
    let orchestrator = Orchestrator::new(config.scoring.clone(), Arc::new(EchoHandler));
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .get(format!("http://{}/ui", addr))
        .send()
        .await
        .unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-encoding"], "identity");
    assert!(res.text().await.unwrap().contains("score me"));
    shutdown.trigger();
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = config(1000);
    config.listener.max_body_size = 16;
    let orchestrator = Orchestrator::new(config.scoring.clone(), Arc::new(EchoHandler));
    let (addr, shutdown) = common::start_server(config, orchestrator).await;

    let res = common::client()
        .post(format!("http://{}/score", addr))
        .body("x".repeat(1024))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    shutdown.trigger();
}
