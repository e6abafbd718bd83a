//! # polypandora - Licensed radio backend
//!
//! Radio backend for the Polyphon hub. The service is session-based: a login
//! yields an auth token, stations stand in for playlists, and every playable
//! URL is short-lived and tied to a single play. Because of that expiry the
//! `pandora` source tag is cache-ineligible — the streaming cache always
//! proxies these tracks straight through.
//!
//! ## Example
//!
//! ```no_run
//! use polypandora::{PandoraClient, PandoraSource};
//! use polysource::MusicSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PandoraClient::from_config().await?;
//!     let source = PandoraSource::new(client);
//!     for station in source.list_playlists().await? {
//!         println!("{} ({})", station.title, station.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use client::PandoraClient;
pub use error::{PandoraError, Result};
pub use source::PandoraSource;
