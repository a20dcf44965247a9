//! Graph executor backend over the TVM C runtime.
//!
//! Linking against `libtvm_runtime` is opt-in through the `tvm` feature.
//! Without it the backend still builds, but loading a module reports how to
//! enable it.

use anyhow::Result;
use tvmrun_core::{Device, ModelArtifact, Runtime};

#[cfg(feature = "tvm")]
mod executor;
#[cfg(feature = "tvm")]
mod ffi;
#[cfg(feature = "tvm")]
mod packed;
#[cfg(not(feature = "tvm"))]
mod stub;

#[cfg(feature = "tvm")]
pub use executor::TvmExecutor;
#[cfg(not(feature = "tvm"))]
pub use stub::TvmExecutor;

pub struct TvmRuntime;

impl TvmRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TvmRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for TvmRuntime {
    type Executor = TvmExecutor;

    fn name(&self) -> &'static str {
        "tvm"
    }

    fn load(&self, artifact: &ModelArtifact, device: Device) -> Result<Self::Executor> {
        let ModelArtifact::SharedLibrary { path, factory } = artifact;
        tracing::debug!(path = %path.display(), factory, ?device, "loading module");
        load_executor(path, factory, device)
    }
}

#[cfg(feature = "tvm")]
fn load_executor(path: &std::path::Path, factory: &str, device: Device) -> Result<TvmExecutor> {
    TvmExecutor::load(path, factory, device)
}

#[cfg(not(feature = "tvm"))]
fn load_executor(path: &std::path::Path, _factory: &str, _device: Device) -> Result<TvmExecutor> {
    anyhow::bail!(
        "failed to load module {}: tvmrun was built without the `tvm` feature",
        path.display()
    )
}
