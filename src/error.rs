use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by `Vector3` operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorError {
    #[error("cannot normalize a zero-length vector")]
    DivideByZero,
}

/// Errors raised while building, loading or persisting a `Scene`.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("invalid scene dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("permission denied: {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

impl SceneError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            SceneError::PermissionDenied { path, source }
        } else {
            SceneError::Io { path, source }
        }
    }

    // the codec reports file errors as ImageError::IoError
    pub(crate) fn codec(path: &Path, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(source) => Self::io(path, source),
            err => SceneError::Codec(err),
        }
    }
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;
