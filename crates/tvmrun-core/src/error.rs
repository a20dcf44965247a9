use std::path::PathBuf;

use crate::DType;

/// Validation failures raised while turning input files into tensors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{} does not exist", path.display())]
    MissingFile { path: PathBuf },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("unknown input name `{0}`")]
    UnknownInput(String),

    #[error("unsupported dtype `{0}`")]
    UnsupportedDtype(String),

    #[error("input `{name}` expects {expected} bytes but {} holds {actual}", path.display())]
    ByteLengthMismatch {
        name: String,
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("tensor buffer holds {actual} bytes, descriptor requires {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("expected a float32 tensor, got {0}")]
    NotFloat32(DType),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
