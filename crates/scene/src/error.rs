//! Error types for the scene and asset boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from scene-graph and material operations.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node no longer exists in the scene")]
    NodeNotFound,
    #[error("material has no uniform named `{0}`")]
    UnknownUniform(String),
    #[error("uniform `{name}` expects a {expected} value")]
    UniformType { name: String, expected: &'static str },
    #[error("node does not carry a shader material")]
    NotAShaderMaterial,
}

/// Errors from fetching assets. Callers fall back to placeholders on any of these.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to import glTF {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("model {0} contains no triangle geometry")]
    EmptyModel(PathBuf),
    #[error("could not start loader thread: {0}")]
    Spawn(#[source] std::io::Error),
}
