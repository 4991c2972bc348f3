//! Read-only file access for the model and static directories.
//!
//! Handlers never touch the filesystem directly: they go through a
//! [`StorageBackend`], which validates request paths, reports metadata used
//! for cache keys, and streams byte ranges without buffering whole files.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
