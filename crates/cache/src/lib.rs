//! In-memory cache of transcoded models.
//!
//! Transcoding a model (normalize, serialize, compress) is CPU-bound and the
//! result only changes when the source file does. This crate keeps the most
//! recently used results in a bounded LRU keyed by a fingerprint of the
//! source file, and guarantees that concurrent requests for the same key
//! run the computation once.
//!
//! # Architecture
//! - [`CacheKey`]: BLAKE3 fingerprint of `(location, modified, size)`. Any
//!   change to the source yields a new key; stale entries age out via LRU.
//! - [`TranscodeCache`]: the LRU of finished containers, plus a map of
//!   in-flight computations. Each in-flight slot is a
//!   [`OnceCell`](tokio::sync::OnceCell) so that waiters share its result;
//!   it moves into the LRU only once it succeeds.
//! - [`CacheStats`]: counters read and reset under the same lock as the
//!   entries, so a snapshot is always consistent.

mod blob;
mod key;
mod stats;
mod transcode;

pub use crate::blob::TranscodedBlob;
pub use crate::key::CacheKey;
pub use crate::stats::{CacheStats, CacheStatus};
pub use crate::transcode::TranscodeCache;
