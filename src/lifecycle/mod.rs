//! Process lifecycle for the scoring server.
//!
//! # Data Flow
//! ```text
//! Shutdown::trigger ─┐
//! SIGINT / SIGTERM ──┴→ HttpServer::run stops accepting
//!                      → in-flight /score requests finish or hit their deadline
//!                      → run() returns
//! ```
//!
//! # Design Decisions
//! - A handler still running detached after its timeout keeps the process
//!   alive until it returns

pub mod shutdown;
pub mod signals;

pub use shutdown::{triggered, Shutdown};
pub use signals::wait_for_signal;
