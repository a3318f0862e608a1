//! # knobserver - HTTP server shell
//!
//! A thin, ergonomic layer over Axum shared by the KNOB Radio binaries:
//!
//! - Simple JSON routes with [`Server::add_route`]
//! - Stateful handlers, nested routers, redirects and embedded static
//!   assets
//! - OpenAPI documentation mounted with Swagger UI
//! - In-memory log buffer streamed over Server-Sent Events, with a
//!   runtime-adjustable level filter
//! - Graceful shutdown on Ctrl+C
//!
//! ## Example
//!
//! ```rust,no_run
//! use knobserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_logging().await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogEntry, LogState, SseLayer, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
