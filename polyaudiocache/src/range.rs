//! HTTP byte-range parsing and slicing.
//!
//! Only the single-range `bytes=<start>-<end>?` form is supported (an open
//! end means "to end of file"); anything else is treated as if no Range
//! header had been sent, which degrades to a full 200 response rather than
//! an error.

/// A parsed `Range` request header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    /// Inclusive end, or `None` for an open-ended range
    pub end: Option<u64>,
}

impl ByteRange {
    /// Parses a `Range: bytes=<start>-<end>?` header value
    pub fn parse(header: &str) -> Option<ByteRange> {
        let spec = header.trim().strip_prefix("bytes=")?;
        let (start_str, end_str) = spec.split_once('-')?;
        let start: u64 = start_str.trim().parse().ok()?;
        let end = match end_str.trim() {
            "" => None,
            s => Some(s.parse::<u64>().ok()?),
        };
        if let Some(end) = end {
            if end < start {
                return None;
            }
        }
        Some(ByteRange { start, end })
    }

    /// Resolves the range against an entry of `total` bytes.
    ///
    /// The end is clamped to the entry size. Returns `None` when the range
    /// selects nothing (start beyond the entry), in which case the caller
    /// serves the full entry.
    pub fn slice(&self, total: u64) -> Option<RangeSlice> {
        if total == 0 || self.start >= total {
            return None;
        }
        let end = self.end.map_or(total - 1, |e| e.min(total - 1));
        Some(RangeSlice {
            start: self.start,
            end,
        })
    }
}

/// A concrete byte window within an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSlice {
    pub start: u64,
    /// Inclusive
    pub end: u64,
}

impl RangeSlice {
    /// Number of bytes selected (always at least one)
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Formats the `Content-Range` response header value
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounded_range() {
        let range = ByteRange::parse("bytes=100-199").unwrap();
        assert_eq!(range.start, 100);
        assert_eq!(range.end, Some(199));
    }

    #[test]
    fn parses_open_ended_range() {
        let range = ByteRange::parse("bytes=42-").unwrap();
        assert_eq!(range.start, 42);
        assert_eq!(range.end, None);
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(ByteRange::parse("bytes=-500").is_none()); // suffix form unsupported
        assert!(ByteRange::parse("bytes=10-5").is_none());
        assert!(ByteRange::parse("items=0-10").is_none());
        assert!(ByteRange::parse("bytes=0-1,5-6").is_none()); // multi-range unsupported
        assert!(ByteRange::parse("bytes=abc-def").is_none());
    }

    #[test]
    fn slice_clamps_to_entry_size() {
        let range = ByteRange::parse("bytes=100-9999").unwrap();
        let slice = range.slice(200).unwrap();
        assert_eq!(slice.start, 100);
        assert_eq!(slice.end, 199);
        assert_eq!(slice.len(), 100);
        assert_eq!(slice.content_range(200), "bytes 100-199/200");
    }

    #[test]
    fn open_range_runs_to_end() {
        let range = ByteRange::parse("bytes=150-").unwrap();
        let slice = range.slice(200).unwrap();
        assert_eq!(slice.len(), 50);
        assert_eq!(slice.content_range(200), "bytes 150-199/200");
    }

    #[test]
    fn out_of_bounds_start_selects_nothing() {
        let range = ByteRange::parse("bytes=500-600").unwrap();
        assert!(range.slice(200).is_none());
        assert!(range.slice(0).is_none());
    }
}
