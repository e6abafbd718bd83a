//! # polyytm - Video-platform music catalog backend
//!
//! Catalog backend for the Polyphon hub, talking to a self-hosted proxy API
//! in front of the upstream music service. The proxy exposes search, album
//! and playlist listings, and per-track stream URL resolution as plain JSON.
//!
//! The [`YtMusicSource`] implements the full capability set of
//! `polysource::MusicSource`; its tracks are cache-eligible, so the streaming
//! cache keeps resolved audio across restarts.
//!
//! ## Example
//!
//! ```no_run
//! use polyytm::{YtMusicClient, YtMusicSource};
//! use polysource::MusicSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = YtMusicClient::from_config()?;
//!     let source = YtMusicSource::new(client);
//!     let results = source.search("daft punk").await?;
//!     println!("{} tracks, {} albums", results.tracks.len(), results.albums.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use client::{ClientBuilder, YtMusicClient};
pub use error::{Result, YtmError};
pub use source::YtMusicSource;
