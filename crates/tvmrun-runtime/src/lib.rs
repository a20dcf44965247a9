pub mod bench;
pub mod config;
pub mod inference;
pub mod input;
pub mod loader;

pub use bench::*;
pub use config::*;
pub use inference::*;
pub use input::*;
pub use loader::*;

use std::io::Write;

use anyhow::Result;
use tvmrun_core::GraphExecutor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Inference,
    Benchmark,
}

impl Mode {
    pub fn select(inputs: &NamedInputs) -> Self {
        if inputs.is_empty() {
            Mode::Benchmark
        } else {
            Mode::Inference
        }
    }
}

/// Benchmarks the executor when no inputs are named, otherwise runs inference.
pub fn dispatch<E: GraphExecutor, W: Write>(
    executor: &mut E,
    inputs: &NamedInputs,
    config: &RunConfig,
    out: &mut W,
) -> Result<Mode> {
    let mode = Mode::select(inputs);
    match mode {
        Mode::Benchmark => {
            run_benchmark(executor, config.device, &config.time_eval, out)?;
        }
        Mode::Inference => run_inference(executor, inputs, config, out)?,
    }
    Ok(mode)
}
