//! Scoring server configuration.
//!
//! # Data Flow
//! ```text
//! scoring.toml
//!     → loader.rs     (read file, deserialize with serde defaults)
//!     → validation.rs (budget, names, status codes, concurrency)
//!     → ServerConfig  (handed to HttpServer; ScoringConfig cloned into the orchestrator)
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; a bad file stops the binary before it binds
//! - Every field has a default, so an empty file is a valid configuration
//! - Validation reports every problem at once

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, load_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ScoringConfig, ServerConfig, UiConfig};
