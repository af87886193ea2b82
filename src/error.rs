use thiserror::Error;

/// Errors raised while building scene objects, cameras or loading scenes.
///
/// Construction is the only place this crate fails: once a shape, light or
/// camera exists, tracing rays through it never returns an error.
#[derive(Error, Debug)]
pub enum TracerError {
    #[error("vector has zero length")]
    ZeroVector,

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid light: {0}")]
    InvalidLight(String),

    #[error("invalid camera setting `{field}`: {reason}")]
    InvalidCamera { field: &'static str, reason: String },

    #[error("camera setting `{0}` was never provided")]
    MissingCameraField(&'static str),

    #[error("image sink is {sink:?} pixels but the camera renders {camera:?}")]
    ResolutionMismatch { sink: (usize, usize), camera: (usize, usize) },

    #[error("invalid scene description: {0}")]
    Scene(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TracerError>;

impl TracerError {
    pub(crate) fn camera(field: &'static str, reason: impl Into<String>)
        -> TracerError {
        TracerError::InvalidCamera { field, reason: reason.into() }
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> TracerError {
        TracerError::InvalidGeometry(reason.into())
    }
}
