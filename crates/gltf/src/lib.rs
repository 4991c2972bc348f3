//! GLTF model handling for the transcoding pipeline.
//!
//! - [`ModelFormat`] and [`Detected`] identify a model by extension or by
//!   content.
//! - [`normalize`] turns either a `.gltf` JSON document or a binary `.glb`
//!   into a single JSON document, tagged with its [`Origin`].
//! - [`Summary`] and [`parts`] describe a document's structure for the info
//!   and manifest endpoints.
//! - [`transcode`] goes all the way to a FASTDOG container.

mod detect;
pub mod error;
mod glb;
mod normalize;
mod summary;
mod transcode;

pub use crate::glb::{GLB_MAGIC, GLB_VERSION, Glb};
pub use crate::normalize::{Normalized, Origin, normalize};
pub use crate::summary::{Part, PartKind, Summary, parts};
pub use crate::transcode::{Transcoded, transcode};

/// A model format recognised by file extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// Anything else.
    #[default]
    Unknown,
    /// GLTF JSON (.gltf)
    Gltf,
    /// Binary GLTF (.glb)
    Glb,
    /// Pre-built FASTDOG container (.fastdog)
    Fastdog,
}

/// What a buffer's leading bytes say it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detected {
    /// Starts with the FASTDOG container magic.
    Fastdog,
    /// GLB magic followed by version 2.
    Glb,
    /// First non-whitespace character opens a JSON object.
    GltfJson,
    Unrecognized,
}
