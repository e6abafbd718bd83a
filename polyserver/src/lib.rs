//! # polyserver - HTTP server shell for Polyphon
//!
//! Thin layer over axum that the binary uses to assemble the hub: create a
//! server from the global configuration, mount routers, start listening, and
//! shut down cleanly on Ctrl+C. Logging bootstrap lives here too, so every
//! entry point initializes tracing the same way.
//!
//! ## Example
//!
//! ```rust,no_run
//! use polyserver::{Server, init_logging};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging();
//!
//!     let mut server = Server::new_configured();
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({ "status": "ok" })
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::init_logging;
pub use server::{Server, ServerInfo};
