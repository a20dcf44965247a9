use std::path::{Path, PathBuf};

/// Name of the factory function exported by compiled graph executor libraries.
pub const DEFAULT_FACTORY: &str = "default";

#[derive(Clone, Debug)]
pub enum ModelArtifact {
    /// A compiled model library (`libmodel.so`) plus the factory to call in it.
    SharedLibrary { path: PathBuf, factory: String },
}

impl ModelArtifact {
    pub fn shared_library(path: impl AsRef<Path>) -> Self {
        Self::SharedLibrary {
            path: path.as_ref().to_path_buf(),
            factory: DEFAULT_FACTORY.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::SharedLibrary { path, .. } => path,
        }
    }
}
