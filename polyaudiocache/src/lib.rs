//! # PolyAudioCache
//!
//! Streaming cache engine for the Polyphon music hub.
//!
//! Given a composite track id and an optional byte range, this crate
//! resolves a playable URL through the source manager, serves committed
//! cache entries with HTTP range support, and on a cache miss proxies the
//! upstream audio stream to the client while transparently teeing it into an
//! on-disk cache entry with an atomic commit.
//!
//! ## On-disk layout
//!
//! ```text
//! {cache_root}/{source_tag}/{native_id}.{ext}        # content
//! {cache_root}/{source_tag}/{native_id}.{ext}.meta   # sidecar JSON
//! {cache_root}/{source_tag}/{native_id}.{ext}.partial  # in-progress write
//! ```
//!
//! An entry is a hit only when both the content file and the sidecar exist
//! under their final names. Entries are immutable once committed and never
//! pruned by this crate — capacity management is a deliberate non-goal.
//!
//! ## Commit protocol
//!
//! Writes land in a `.partial` file, are renamed into place on completion,
//! and only then gain a sidecar. A reader racing a writer observes a miss
//! (redundant upstream work at worst), never a truncated entry.

pub mod engine;
pub mod layout;
pub mod prefetch;
pub mod range;
pub mod serve_ext;
pub mod sidecar;

pub use engine::{CacheError, StreamEngine};
pub use layout::{CacheHit, CacheLayout, EXTENSIONS, ext_for_content_type};
pub use prefetch::Prefetcher;
pub use range::{ByteRange, RangeSlice};
pub use serve_ext::{SESSION_HEADER, StreamState, stream_router};
pub use sidecar::Sidecar;
