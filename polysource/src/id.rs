//! Composite track identifiers.
//!
//! Every track in Polyphon is addressed by a composite id: the tag of the
//! backend it lives on plus that backend's native track id, serialized as
//! `"{tag}:{native_id}"`. The codec here is deliberately infallible so the
//! streaming endpoint stays resilient to old links: anything that does not
//! parse degrades to the legacy primary backend instead of erroring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag identifying a concrete backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    /// Video-platform music catalog
    YtMusic,
    /// Licensed radio service
    Pandora,
}

impl SourceTag {
    /// The legacy primary backend, used when decoding ids without a tag
    pub const LEGACY_DEFAULT: SourceTag = SourceTag::YtMusic;

    /// All known tags, in a stable order
    pub const ALL: [SourceTag; 2] = [SourceTag::YtMusic, SourceTag::Pandora];

    /// Returns the wire representation of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::YtMusic => "ytmusic",
            SourceTag::Pandora => "pandora",
        }
    }

    /// Parses a tag from its wire representation
    pub fn parse(s: &str) -> Option<SourceTag> {
        match s {
            "ytmusic" => Some(SourceTag::YtMusic),
            "pandora" => Some(SourceTag::Pandora),
            _ => None,
        }
    }

    /// Whether audio from this backend may be cached on disk.
    ///
    /// Pandora hands out short-lived per-play URLs; caching those bodies
    /// would serve stale audio, so the tag is excluded from the disk cache.
    pub fn cacheable(&self) -> bool {
        match self {
            SourceTag::YtMusic => true,
            SourceTag::Pandora => false,
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = UnknownSourceTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceTag::parse(s).ok_or_else(|| UnknownSourceTag(s.to_string()))
    }
}

/// Error returned by [`SourceTag::from_str`] for unrecognized tags
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown source tag: {0}")]
pub struct UnknownSourceTag(pub String);

/// A `(source, native id)` pair — the unit of cross-backend addressing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId {
    pub tag: SourceTag,
    pub native_id: String,
}

impl SourceId {
    pub fn new(tag: SourceTag, native_id: impl Into<String>) -> Self {
        Self {
            tag,
            native_id: native_id.into(),
        }
    }

    /// Serializes the pair as a single opaque string, `"{tag}:{native_id}"`
    pub fn encode(&self) -> String {
        format!("{}:{}", self.tag, self.native_id)
    }

    /// Decodes a composite id.
    ///
    /// The split happens at the *first* colon only, so native ids containing
    /// colons round-trip. Ids without a colon, or with an unrecognized tag,
    /// are treated as legacy ids on [`SourceTag::LEGACY_DEFAULT`] with the
    /// whole input as the native id. This function never fails.
    pub fn decode(composite: &str) -> SourceId {
        if let Some((head, rest)) = composite.split_once(':') {
            if let Some(tag) = SourceTag::parse(head) {
                return SourceId::new(tag, rest);
            }
        }
        SourceId::new(SourceTag::LEGACY_DEFAULT, composite)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag, self.native_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let id = SourceId::new(SourceTag::YtMusic, "abc123");
        assert_eq!(id.encode(), "ytmusic:abc123");
        assert_eq!(SourceId::decode(&id.encode()), id);
    }

    #[test]
    fn native_id_with_colons_roundtrips() {
        let id = SourceId::new(SourceTag::YtMusic, "abc:123");
        let decoded = SourceId::decode(&id.encode());
        assert_eq!(decoded.tag, SourceTag::YtMusic);
        assert_eq!(decoded.native_id, "abc:123");
    }

    #[test]
    fn colonless_id_falls_back_to_legacy_default() {
        let decoded = SourceId::decode("noColonHere");
        assert_eq!(decoded.tag, SourceTag::LEGACY_DEFAULT);
        assert_eq!(decoded.native_id, "noColonHere");
    }

    #[test]
    fn unknown_tag_falls_back_to_legacy_default() {
        let decoded = SourceId::decode("spotify:xyz");
        assert_eq!(decoded.tag, SourceTag::LEGACY_DEFAULT);
        // The whole input stays addressable, not just the part after the colon
        assert_eq!(decoded.native_id, "spotify:xyz");
    }

    #[test]
    fn pandora_roundtrips() {
        let decoded = SourceId::decode("pandora:station-42");
        assert_eq!(decoded.tag, SourceTag::Pandora);
        assert_eq!(decoded.native_id, "station-42");
    }

    #[test]
    fn cache_eligibility_by_tag() {
        assert!(SourceTag::YtMusic.cacheable());
        assert!(!SourceTag::Pandora.cacheable());
    }

    #[test]
    fn tag_display_and_fromstr() {
        for tag in SourceTag::ALL {
            assert_eq!(tag.as_str().parse::<SourceTag>().unwrap(), tag);
        }
        assert!("bandcamp".parse::<SourceTag>().is_err());
    }
}
