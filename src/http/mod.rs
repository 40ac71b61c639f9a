//! HTTP transport for the scoring engine.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routes, middleware)
//!     → request.rs (assign/propagate x-request-id)
//!     → POST /score → scoring::Orchestrator → ResponseContract → wire response
//!     → GET /       → health probe
//!     → GET /ui     → static page
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
