/// Error types for model loading and configuration

use thiserror::Error;

/// Why an icon's model could not be turned into a mesh.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("request for {path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("file too small to be a valid STL ({0} bytes)")]
    StlTooSmall(usize),

    #[error("unexpected end of STL data after {parsed} of {expected} triangles")]
    StlTruncated { parsed: usize, expected: usize },

    #[error("failed to parse ASCII STL: {0}")]
    StlSyntax(String),

    #[error("failed to parse glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("model contains no triangles")]
    Empty,
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}
