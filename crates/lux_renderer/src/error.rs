//! Error types for scene assembly and configuration loading.
//!
//! Nothing on the per-pixel hot path returns these: intersection, shading and
//! filtering fall back to "no hit", black or the background color instead.

use thiserror::Error;

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
    #[error("mesh index count {0} is not a multiple of three")]
    IndicesNotTriangles(usize),

    #[error("mesh index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("mesh has no triangles")]
    EmptyMesh,

    #[error("material {0} does not belong to this scene")]
    UnknownMaterial(usize),

    #[error("expected {expected} texture coordinates, found {found}")]
    TextureCoordinateCount { expected: usize, found: usize },
}

/// Errors that can occur while loading or validating a [`RenderConfig`](crate::RenderConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} = {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}

pub type SceneResult<T> = Result<T, SceneError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
