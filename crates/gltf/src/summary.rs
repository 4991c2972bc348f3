//! Structural summaries of a GLTF document.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde_json::Value;

/// Texture payloads live outside the JSON document, so their size is a flat guess.
const TEXTURE_ESTIMATE: u64 = 1024 * 1024;

/// Counts of the top-level collections clients care about before downloading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub animations: usize,
    pub scenes: usize,
}

impl Summary {
    /// Missing or non-array collections count as empty.
    #[must_use]
    pub fn of(document: &Value) -> Self {
        Self {
            nodes: count(document, "nodes"),
            meshes: count(document, "meshes"),
            materials: count(document, "materials"),
            textures: count(document, "textures"),
            animations: count(document, "animations"),
            scenes: count(document, "scenes"),
        }
    }
}

fn count(document: &Value, key: &str) -> usize {
    document.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Geometry,
    Material,
    Texture,
}

/// One independently loadable piece of a model, as advertised in a manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Part {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitives: Option<usize>,
    pub estimated_size: u64,
}

/// List meshes, then materials, then textures, each with a size estimate.
///
/// Mesh estimates are four fifths of the mesh's serialized JSON, material
/// estimates are the material's serialized JSON, and textures are a flat
/// mebibyte.
pub fn parts(document: &Value) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    for (index, mesh) in items(document, "meshes").iter().enumerate() {
        let primitives = mesh.get("primitives").and_then(Value::as_array).map_or(0, Vec::len);
        parts.push(Part {
            name: format!("mesh_{index}"),
            kind: PartKind::Geometry,
            primitives: Some(primitives),
            estimated_size: serialized_len(mesh)? * 4 / 5,
        });
    }
    for (index, material) in items(document, "materials").iter().enumerate() {
        parts.push(Part {
            name: format!("material_{index}"),
            kind: PartKind::Material,
            primitives: None,
            estimated_size: serialized_len(material)?,
        });
    }
    for index in 0..items(document, "textures").len() {
        parts.push(Part {
            name: format!("texture_{index}"),
            kind: PartKind::Texture,
            primitives: None,
            estimated_size: TEXTURE_ESTIMATE,
        });
    }
    Ok(parts)
}

fn items<'a>(document: &'a Value, key: &str) -> &'a [Value] {
    document.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

fn serialized_len(value: &Value) -> Result<u64> {
    let bytes = serde_json::to_vec(value).or_raise(|| ErrorKind::Serialize)?;
    Ok(bytes.len() as u64)
}
