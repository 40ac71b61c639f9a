//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scoring_server::config::ServerConfig;
use scoring_server::lifecycle::Shutdown;
use scoring_server::scoring::{
    HookError, LifecycleHooks, Orchestrator, RequestContext, ScoringError, ScoringHandler, Telemetry,
};
use scoring_server::HttpServer;
use tokio::net::TcpListener;

/// Hooks that count every start and stop.
#[derive(Default)]
pub struct RecordingHooks {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingHooks {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl LifecycleHooks for RecordingHooks {
    fn start(&self, _correlation_id: &str) -> Result<(), HookError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self, _correlation_id: &str) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Telemetry that keeps every reported failure.
#[derive(Default)]
pub struct RecordingTelemetry {
    pub reports: Mutex<Vec<(ScoringError, String)>>,
}

#[allow(dead_code)]
impl RecordingTelemetry {
    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<ScoringError> {
        self.reports.lock().unwrap().last().map(|(e, _)| e.clone())
    }
}

impl Telemetry for RecordingTelemetry {
    fn report(&self, failure: &ScoringError, context: &RequestContext) {
        self.reports
            .lock()
            .unwrap()
            .push((failure.clone(), context.request_id.clone()));
    }
}

/// An orchestrator wired to recording collaborators.
#[allow(dead_code)]
pub fn recording_orchestrator(
    config: &ServerConfig,
    handler: Arc<dyn ScoringHandler>,
) -> (Orchestrator, Arc<RecordingHooks>, Arc<RecordingTelemetry>) {
    let hooks = Arc::new(RecordingHooks::default());
    let telemetry = Arc::new(RecordingTelemetry::default());
    let orchestrator = Orchestrator::new(config.scoring.clone(), handler)
        .with_hooks(hooks.clone())
        .with_telemetry(telemetry.clone());
    (orchestrator, hooks, telemetry)
}

/// Start a server on an ephemeral port. Keep the returned `Shutdown` alive
/// for as long as the server should run.
#[allow(dead_code)]
pub async fn start_server(config: ServerConfig, orchestrator: Orchestrator) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_orchestrator(config, orchestrator);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// A client that never reuses pooled connections across tests.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
