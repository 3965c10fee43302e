/// Model format detection and parsing

use crate::error::ModelError;
use crate::geometry::Mesh;
use crate::gltf_loader::parse_gltf;
use crate::stl::parse_stl;

/// Supported model encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Stl,
    Gltf,
}

impl ModelFormat {
    /// Guess the format from the asset path's extension, ignoring any query
    /// string or fragment.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (_, extension) = file.rsplit_once('.')?;

        match extension.to_ascii_lowercase().as_str() {
            "stl" => Some(ModelFormat::Stl),
            "glb" | "gltf" => Some(ModelFormat::Gltf),
            _ => None,
        }
    }

    /// Guess the format from the first bytes of the payload
    pub fn sniff(data: &[u8]) -> Self {
        let first = data.iter().find(|b| !b.is_ascii_whitespace());
        if data.starts_with(b"glTF") || first == Some(&b'{') {
            ModelFormat::Gltf
        } else {
            ModelFormat::Stl
        }
    }
}

/// Parse a fetched asset into a non-empty mesh
pub fn parse_model(path: &str, data: &[u8]) -> Result<Mesh, ModelError> {
    let format = ModelFormat::from_path(path).unwrap_or_else(|| ModelFormat::sniff(data));

    let mesh = match format {
        ModelFormat::Stl => parse_stl(data)?,
        ModelFormat::Gltf => parse_gltf(data)?,
    };

    if mesh.is_empty() {
        return Err(ModelError::Empty);
    }
    Ok(mesh)
}
