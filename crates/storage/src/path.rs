//! Request path validation.
//!
//! Every path handed to a backend comes from a URL, so it is treated as
//! hostile until it has been reduced to plain components below the root.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Normalize a relative storage path, refusing anything that would resolve
/// outside the backend root.
///
/// `.` segments, repeated separators and a leading `/` are dropped, and `..`
/// is resolved against the components seen so far. Null bytes, drive
/// prefixes and paths that normalize to nothing fail with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fastdog_storage::validate_path;
///
/// assert_eq!(validate_path("/duck/./Duck.gltf").unwrap(), Path::new("duck/Duck.gltf"));
/// assert_eq!(validate_path("duck/textures/../Duck.glb").unwrap(), Path::new("duck/Duck.glb"));
/// assert!(validate_path("../secrets.gltf").is_err());
/// assert!(validate_path("Duck\0.gltf").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());

    let mut normalized: Vec<&std::ffi::OsStr> = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(segment) => normalized.push(segment),
            Component::ParentDir if normalized.pop().is_none() => exn::bail!(invalid()),
            Component::ParentDir | Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if normalized.is_empty() {
        exn::bail!(invalid());
    }
    Ok(normalized.into_iter().collect())
}

/// Lowercased final extension of a path, without the dot.
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Duck.gltf", "Duck.gltf")]
    #[case("/Duck.gltf", "Duck.gltf")]
    #[case("vehicles//truck/./Truck.glb", "vehicles/truck/Truck.glb")]
    #[case("vehicles/truck/../Bus.glb", "vehicles/Bus.glb")]
    #[case("vehicles/truck/", "vehicles/truck")]
    #[case("a/b/..", "a")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("./")]
    #[case("//")]
    #[case("..")]
    #[case("../models/Duck.gltf")]
    #[case("models/../../Duck.gltf")]
    #[case("Duck\0.gltf")]
    fn rejects(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(path) if path == Path::new(input)));
    }

    #[cfg(windows)]
    #[test]
    fn backslashes_are_separators_on_windows() {
        assert_eq!(validate("vehicles\\truck\\Truck.glb").unwrap(), Path::new("vehicles/truck/Truck.glb"));
    }

    #[rstest]
    #[case("Duck.GLTF", Some("gltf"))]
    #[case("archive.tar.gz", Some("gz"))]
    #[case("README", None)]
    #[case(".glb", None)]
    fn lowercased_extension(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(extension(Path::new(input)).as_deref(), expected);
    }
}
