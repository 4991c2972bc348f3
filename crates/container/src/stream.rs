//! Incremental Decoding

use crate::codec::{Decoded, decode};
use crate::error::Result;
use crate::header::{HEADER_LEN, read_prefix};

/// Outcome of feeding a chunk to a [`StreamDecoder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// More bytes are required. `expected` is known once the header has arrived.
    NeedMore { received: usize, expected: Option<usize> },
    /// The whole container arrived and decoded successfully.
    Complete(Decoded),
}

/// Accumulates a container delivered in arbitrary chunks.
///
/// Magic and version are validated as soon as the header is buffered, so a
/// client streaming the wrong resource fails after sixteen bytes rather than
/// after the whole download.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    expected: Option<usize>,
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and decode if the container is now complete.
    ///
    /// Bytes past the declared container length are ignored. After
    /// [`Progress::Complete`] or an error, call [`reset`](Self::reset) before
    /// feeding another container.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Progress> {
        self.buffer.extend_from_slice(chunk);
        if self.expected.is_none() && self.buffer.len() >= HEADER_LEN {
            let (version, total) = read_prefix(&self.buffer)?;
            tracing::trace!(%version, total, "container header received");
            self.expected = Some(total);
        }
        match self.expected {
            Some(total) if self.buffer.len() >= total => Ok(Progress::Complete(decode(&self.buffer[..total])?)),
            expected => Ok(Progress::NeedMore { received: self.buffer.len(), expected }),
        }
    }

    #[must_use]
    pub fn received(&self) -> usize {
        self.buffer.len()
    }

    /// Total container length, once the header has arrived.
    #[must_use]
    pub fn expected(&self) -> Option<usize> {
        self.expected
    }

    /// Fraction of the container received so far, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        match self.expected {
            Some(total) if total > 0 => (self.buffer.len() as f64 / total as f64).min(1.0),
            _ => 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.expected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{FormatVersion, encode};
    use rstest::rstest;

    const DOCUMENT: &[u8] = br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{"name":"root"}]}"#;

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(16)]
    #[case(4096)]
    fn decodes_across_chunk_sizes(#[case] chunk_size: usize) {
        let container = encode(DOCUMENT, FormatVersion::Glb).unwrap();
        let mut decoder = StreamDecoder::new();
        let mut result = None;
        for chunk in container.chunks(chunk_size) {
            if let Progress::Complete(decoded) = decoder.push(chunk).unwrap() {
                result = Some(decoded);
            }
        }
        let decoded = result.expect("container should complete");
        assert_eq!(decoded.json, DOCUMENT);
        assert_eq!(decoded.version, FormatVersion::Glb);
        assert_eq!(decoder.progress(), 1.0);
    }

    #[test]
    fn reports_expected_length_after_header() {
        let container = encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        let mut decoder = StreamDecoder::new();

        let progress = decoder.push(&container[..HEADER_LEN - 1]).unwrap();
        assert_eq!(progress, Progress::NeedMore { received: HEADER_LEN - 1, expected: None });
        assert_eq!(decoder.progress(), 0.0);

        let progress = decoder.push(&container[HEADER_LEN - 1..HEADER_LEN]).unwrap();
        assert_eq!(progress, Progress::NeedMore { received: HEADER_LEN, expected: Some(container.len()) });
        assert!(decoder.progress() > 0.0 && decoder.progress() < 1.0);
    }

    #[test]
    fn wrong_magic_fails_at_header() {
        let mut decoder = StreamDecoder::new();
        let err = decoder.push(b"glTF\x02\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00").unwrap_err();
        assert_eq!(*err, ErrorKind::Format);
    }

    #[test]
    fn reset_allows_reuse() {
        let container = encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        let mut decoder = StreamDecoder::new();
        decoder.push(&container[..10]).unwrap();
        decoder.reset();
        assert_eq!(decoder.received(), 0);
        assert_eq!(decoder.expected(), None);
        assert!(matches!(decoder.push(&container).unwrap(), Progress::Complete(_)));
    }
}
