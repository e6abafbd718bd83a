//! On-disk cache layout.
//!
//! One root directory, one subdirectory per source tag, content files named
//! `{native_id}.{ext}` with a `.meta` JSON sidecar next to each. An entry is
//! a hit only when *both* the content file and its sidecar exist under their
//! final names; files still carrying the `.partial` suffix are invisible to
//! lookup. This naming convention, together with the atomicity of rename, is
//! what lets readers and writers race without locks.

use polysource::SourceId;
use std::path::{Path, PathBuf};

/// Extension probe order, fixed so lookup cost is bounded by this list
/// rather than by directory size.
pub const EXTENSIONS: [&str; 5] = ["webm", "m4a", "ogg", "mp3", "bin"];

/// Suffix carried by in-progress cache writes
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Suffix of the metadata sidecar
pub const SIDECAR_SUFFIX: &str = ".meta";

/// Maps a sniffed content type onto a cache file extension
pub fn ext_for_content_type(content_type: &str) -> &'static str {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("webm") {
        "webm"
    } else if ct.contains("mp4") || ct.contains("m4a") {
        "m4a"
    } else if ct.contains("ogg") {
        "ogg"
    } else if ct.contains("mpeg") {
        "mp3"
    } else {
        "bin"
    }
}

/// A committed cache entry found on disk
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub content_path: PathBuf,
    pub sidecar_path: PathBuf,
}

/// Path helper over the cache root
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Creates the layout, making the root directory if needed
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding entries of one source tag
    pub fn source_dir(&self, id: &SourceId) -> PathBuf {
        self.root.join(id.tag.as_str())
    }

    /// Final content path for an entry with the given extension
    pub fn content_path(&self, id: &SourceId, ext: &str) -> PathBuf {
        self.source_dir(id)
            .join(format!("{}.{ext}", safe_file_stem(&id.native_id)))
    }

    /// Sidecar path next to a content path
    pub fn sidecar_path(content_path: &Path) -> PathBuf {
        let mut os = content_path.as_os_str().to_owned();
        os.push(SIDECAR_SUFFIX);
        PathBuf::from(os)
    }

    /// Temporary path used while an entry is being written
    pub fn partial_path(content_path: &Path) -> PathBuf {
        let mut os = content_path.as_os_str().to_owned();
        os.push(PARTIAL_SUFFIX);
        PathBuf::from(os)
    }

    /// Probes the fixed extension list for a committed entry.
    ///
    /// Returns the first extension for which both the content file and its
    /// sidecar exist under final names. A reader racing an in-progress write
    /// simply sees a miss here, never a truncated entry.
    pub fn lookup(&self, id: &SourceId) -> Option<CacheHit> {
        for ext in EXTENSIONS {
            let content_path = self.content_path(id, ext);
            let sidecar_path = Self::sidecar_path(&content_path);
            if content_path.is_file() && sidecar_path.is_file() {
                return Some(CacheHit {
                    content_path,
                    sidecar_path,
                });
            }
        }
        None
    }
}

/// Native ids become file names; keep path separators and relative-path
/// tricks out of them.
fn safe_file_stem(native_id: &str) -> String {
    native_id
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
