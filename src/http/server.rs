//! Axum transport in front of the orchestrator.
//!
//! # Responsibilities
//! - Route `/score`, `/` and `/ui`
//! - Layer request ids, tracing and the body limit over every route
//! - Serve until the shutdown broadcast fires
//! - Contain anything that escapes the orchestrator (last-resort 500)

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::{ServerConfig, UiConfig};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::triggered;
use crate::observability::metrics;
use crate::scoring::supervisor::panic_message;
use crate::scoring::{InvocationRequest, Orchestrator, RequestContext, ScoringError, ScoringHandler};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub ui: UiConfig,
}

/// HTTP server exposing the scoring engine.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server serving `handler` with default hooks and telemetry.
    pub fn new(config: ServerConfig, handler: Arc<dyn ScoringHandler>) -> Self {
        let orchestrator = Orchestrator::new(config.scoring.clone(), handler);
        Self::with_orchestrator(config, orchestrator)
    }

    /// Create a server around a fully configured orchestrator.
    pub fn with_orchestrator(config: ServerConfig, orchestrator: Orchestrator) -> Self {
        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            ui: config.ui.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let ui = Router::new()
            .route("/ui", get(ui_page))
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_ENCODING,
                HeaderValue::from_static("identity"),
            ));

        Router::new()
            .route("/score", post(score))
            .route("/", get(health_probe))
            .merge(ui)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_ms = self.config.scoring.timeout_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                triggered(shutdown).await;
                tracing::info!("Shutdown requested");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Scoring endpoint.
async fn score(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let start_time = Instant::now();
    let context = RequestContext::new(request_id(&headers), "/score");
    let request = InvocationRequest::from_http(body, &headers);

    let invocation = AssertUnwindSafe(state.orchestrator.handle(request, &context)).catch_unwind();
    let contract = match invocation.await {
        Ok(contract) => contract,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(request_id = %context.request_id, panic = %message, "Unhandled failure while scoring");
            ScoringError::Unclassified(message).into_contract()
        }
    };

    let status = contract.status.as_u16();
    tracing::info!(request_id = %context.request_id, status, "Scoring request completed");
    metrics::record_request(status, start_time);

    contract.into_response()
}

/// Liveness probe.
async fn health_probe() -> &'static str {
    "Healthy"
}

/// Static test page.
async fn ui_page(State(state): State<AppState>) -> Response {
    if !state.ui.enabled {
        return (StatusCode::NOT_FOUND, "UI disabled").into_response();
    }

    match tokio::fs::read(&state.ui.path).await {
        Ok(page) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], page).into_response(),
        Err(e) => {
            tracing::warn!(path = %state.ui.path, error = %e, "UI page unavailable");
            (StatusCode::NOT_FOUND, "UI page not found").into_response()
        }
    }
}
