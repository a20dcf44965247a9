use anyhow::Result;

use crate::{Device, InputInfo, ModelArtifact, Tensor};

/// Settings forwarded to the runtime's time evaluator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeEvalConfig {
    /// Executor function to time.
    pub entry: String,
    /// Runs averaged into one measurement.
    pub number: i32,
    /// Measurements taken.
    pub repeat: i32,
    /// Lower bound on the duration of one measurement.
    pub min_repeat_ms: i32,
    /// Registered function run before every measurement; empty for none.
    pub preproc: String,
}

impl Default for TimeEvalConfig {
    fn default() -> Self {
        Self {
            entry: "run".to_string(),
            number: 10,
            repeat: 1,
            min_repeat_ms: 500,
            preproc: String::new(),
        }
    }
}

pub trait Runtime {
    type Executor: GraphExecutor;

    fn name(&self) -> &'static str;
    fn load(&self, artifact: &ModelArtifact, device: Device) -> Result<Self::Executor>;
}

/// The graph executor calling convention: named input slots, indexed
/// input/output slots and a blocking `run`.
pub trait GraphExecutor {
    /// Live handle to an input or output slot owned by the executor.
    type Slot;

    fn input_info(&self) -> Result<InputInfo>;
    fn set_input(&mut self, name: &str, tensor: Tensor) -> Result<()>;
    fn input(&self, index: usize) -> Result<Self::Slot>;
    fn output(&self, index: usize) -> Result<Self::Slot>;

    /// Copies output `index` back to host memory.
    fn output_tensor(&self, index: usize) -> Result<Tensor>;

    fn num_inputs(&self) -> Result<usize>;
    fn num_outputs(&self) -> Result<usize>;
    fn run(&mut self) -> Result<()>;

    /// Times `config.entry` with `args` as its flat argument list and returns
    /// the mean duration in seconds.
    fn time_eval(&self, device: Device, config: &TimeEvalConfig, args: &[Self::Slot])
        -> Result<f64>;
}
