//! `Range` header handling.
//!
//! Only a single `bytes=` range is honoured. Anything that does not parse
//! cleanly falls back to the full representation, which is always a valid
//! answer to a range request.

use axum::http::{HeaderMap, header};
use std::ops::Range;

/// An inclusive byte range that lies within the representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header for a representation of `total` bytes.
    #[must_use]
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }

    /// The same bytes as a half-open range.
    #[must_use]
    pub fn as_range(&self) -> Range<u64> {
        self.start..self.end + 1
    }
}

/// What a request asked for, resolved against the representation length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable `Range` header: send everything with `200 OK`.
    Full,
    Partial(ByteRange),
    /// The range starts at or beyond the end: `416`.
    Unsatisfiable,
}

impl RangeRequest {
    pub fn from_headers(headers: &HeaderMap, len: u64) -> Self {
        let value = headers.get(header::RANGE).and_then(|value| value.to_str().ok());
        Self::parse(value, len)
    }

    /// Resolve a `Range` header value against a representation of `len` bytes.
    ///
    /// ```
    /// use fastdog_server::{ByteRange, RangeRequest};
    ///
    /// assert_eq!(
    ///     RangeRequest::parse(Some("bytes=500-"), 1000),
    ///     RangeRequest::Partial(ByteRange { start: 500, end: 999 }),
    /// );
    /// assert_eq!(
    ///     RangeRequest::parse(Some("bytes=0-2000"), 1000),
    ///     RangeRequest::Partial(ByteRange { start: 0, end: 999 }),
    /// );
    /// assert_eq!(RangeRequest::parse(Some("bytes=1000-"), 1000), RangeRequest::Unsatisfiable);
    /// assert_eq!(RangeRequest::parse(Some("pages=1-2"), 1000), RangeRequest::Full);
    /// ```
    #[must_use]
    pub fn parse(value: Option<&str>, len: u64) -> Self {
        let Some(spec) = value.and_then(|value| value.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };
        if spec.contains(',') {
            return Self::Full;
        }
        let Some((start, end)) = spec.split_once('-') else {
            return Self::Full;
        };
        let (start, end) = (start.trim(), end.trim());

        if start.is_empty() {
            // Suffix range: the last `n` bytes.
            let Ok(suffix) = end.parse::<u64>() else {
                return Self::Full;
            };
            if suffix == 0 || len == 0 {
                return Self::Unsatisfiable;
            }
            return Self::Partial(ByteRange { start: len.saturating_sub(suffix), end: len - 1 });
        }

        let Ok(start) = start.parse::<u64>() else {
            return Self::Full;
        };
        let end = if end.is_empty() {
            None
        } else {
            match end.parse::<u64>() {
                Ok(end) if end >= start => Some(end),
                _ => return Self::Full,
            }
        };
        if start >= len {
            return Self::Unsatisfiable;
        }
        let last = len - 1;
        Self::Partial(ByteRange { start, end: end.map_or(last, |end| end.min(last)) })
    }

    /// The half-open byte range to send, `None` when unsatisfiable.
    #[must_use]
    pub fn span(&self, len: u64) -> Option<Range<u64>> {
        match self {
            Self::Full => Some(0..len),
            Self::Partial(range) => Some(range.as_range()),
            Self::Unsatisfiable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn partial(start: u64, end: u64) -> RangeRequest {
        RangeRequest::Partial(ByteRange { start, end })
    }

    #[rstest]
    #[case(None, RangeRequest::Full)]
    #[case(Some("bytes=0-99"), partial(0, 99))]
    #[case(Some("bytes=500-"), partial(500, 999))]
    #[case(Some("bytes=0-2000"), partial(0, 999))]
    #[case(Some("bytes=999-999"), partial(999, 999))]
    #[case(Some("bytes=-100"), partial(900, 999))]
    #[case(Some("bytes=-5000"), partial(0, 999))]
    #[case(Some(" bytes=10-20 "), partial(10, 20))]
    #[case(Some("bytes=1000-"), RangeRequest::Unsatisfiable)]
    #[case(Some("bytes=1000-1200"), RangeRequest::Unsatisfiable)]
    #[case(Some("bytes=-0"), RangeRequest::Unsatisfiable)]
    #[case(Some("bytes=abc-def"), RangeRequest::Full)]
    #[case(Some("bytes=20-10"), RangeRequest::Full)]
    #[case(Some("bytes=0-1,5-6"), RangeRequest::Full)]
    #[case(Some("bytes=100"), RangeRequest::Full)]
    #[case(Some("items=0-1"), RangeRequest::Full)]
    #[case(Some("bytes=-"), RangeRequest::Full)]
    fn parse_against_length_1000(#[case] value: Option<&str>, #[case] expected: RangeRequest) {
        assert_eq!(RangeRequest::parse(value, 1000), expected);
    }

    #[test]
    fn empty_representation_cannot_satisfy_a_range() {
        assert_eq!(RangeRequest::parse(Some("bytes=0-"), 0), RangeRequest::Unsatisfiable);
        assert_eq!(RangeRequest::parse(Some("bytes=-1"), 0), RangeRequest::Unsatisfiable);
        assert_eq!(RangeRequest::parse(None, 0).span(0), Some(0..0));
    }

    #[test]
    fn range_arithmetic() {
        let range = ByteRange { start: 500, end: 999 };
        assert_eq!(range.len(), 500);
        assert_eq!(range.content_range(1000), "bytes 500-999/1000");
        assert_eq!(range.as_range(), 500..1000);
    }

    #[test]
    fn reads_the_range_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(RangeRequest::from_headers(&headers, 10), RangeRequest::Full);
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=2-4"));
        assert_eq!(RangeRequest::from_headers(&headers, 10), partial(2, 4));
        assert_eq!(RangeRequest::from_headers(&headers, 10).span(10), Some(2..5));
    }
}
