use crate::glb::{GLB_MAGIC, GLB_VERSION};
use crate::{Detected, ModelFormat};
use std::fmt;
use std::path::Path;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

impl ModelFormat {
    /// Detect format from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| match ext.to_lowercase().as_str() {
                "gltf" => ModelFormat::Gltf,
                "glb" => ModelFormat::Glb,
                "fastdog" => ModelFormat::Fastdog,
                _ => ModelFormat::Unknown,
            })
            .unwrap_or(ModelFormat::Unknown)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Unknown => "unknown",
            ModelFormat::Gltf => "gltf",
            ModelFormat::Glb => "glb",
            ModelFormat::Fastdog => "fastdog",
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&[u8]> for Detected {
    fn from(value: &[u8]) -> Self {
        Detected::sniff(value)
    }
}

impl Detected {
    /// Classify a buffer by its leading bytes.
    ///
    /// Extensions are never consulted: a `.gltf` file that is really a GLB is
    /// treated as a GLB.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        if fastdog_container::is_container(bytes) {
            return Detected::Fastdog;
        }
        if bytes.len() >= 8 && bytes.starts_with(&GLB_MAGIC) && bytes[4..8] == GLB_VERSION.to_le_bytes() {
            return Detected::Glb;
        }
        let text = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
        match text.iter().find(|byte| !byte.is_ascii_whitespace()) {
            Some(b'{') => Detected::GltfJson,
            _ => Detected::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Detected, ModelFormat};
    use rstest::rstest;

    #[rstest]
    #[case("duck.gltf", ModelFormat::Gltf)]
    #[case("duck.GLB", ModelFormat::Glb)]
    #[case("duck.fastdog", ModelFormat::Fastdog)]
    #[case("duck.obj", ModelFormat::Unknown)]
    #[case("duck", ModelFormat::Unknown)]
    // A dotfile has no extension.
    #[case(".glb", ModelFormat::Unknown)]
    fn format_from_path(#[case] path: &str, #[case] expected: ModelFormat) {
        assert_eq!(ModelFormat::from_path(path), expected);
    }

    #[rstest]
    #[case(b"FASTDOG1\x01\x00\x00\x00", Detected::Fastdog)]
    #[case(b"glTF\x02\x00\x00\x00\x0c\x00\x00\x00", Detected::Glb)]
    #[case(b"glTF\x01\x00\x00\x00\x0c\x00\x00\x00", Detected::Unrecognized)]
    #[case(b"{\"asset\":{}}", Detected::GltfJson)]
    #[case(b"  \n\t{}", Detected::GltfJson)]
    #[case(b"\xEF\xBB\xBF{}", Detected::GltfJson)]
    #[case(b"[1, 2]", Detected::Unrecognized)]
    #[case(b"", Detected::Unrecognized)]
    #[case(b"glTF", Detected::Unrecognized)]
    fn sniff_leading_bytes(#[case] bytes: &[u8], #[case] expected: Detected) {
        assert_eq!(Detected::sniff(bytes), expected);
        assert_eq!(<&[u8] as Into<Detected>>::into(bytes), expected);
    }
}
