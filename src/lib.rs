//! Bounded-time scoring server library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod scoring;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use scoring::{Orchestrator, ScoringHandler};
