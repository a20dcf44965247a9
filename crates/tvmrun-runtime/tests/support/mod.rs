#![allow(dead_code)]

use std::cell::RefCell;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use tvmrun_core::{
    DType, Device, GraphExecutor, InputInfo, Shape, Tensor, TimeEvalConfig,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Input(usize),
    Output(usize),
}

#[derive(Debug)]
pub struct TimeEvalCall {
    pub device: Device,
    pub config: TimeEvalConfig,
    pub args: Vec<Slot>,
}

/// In-memory executor that records every call made against it.
#[derive(Default)]
pub struct RecordingExecutor {
    pub info: InputInfo,
    pub bound: Vec<(String, Tensor)>,
    pub outputs: Vec<Tensor>,
    pub num_inputs: usize,
    pub runs: usize,
    pub info_queries: RefCell<usize>,
    pub mean_secs: Option<f64>,
    pub time_evals: RefCell<Vec<TimeEvalCall>>,
    /// When set, host copies of outputs fail with this message.
    pub output_copy_error: Option<String>,
    pub output_fetches: RefCell<Vec<usize>>,
}

impl RecordingExecutor {
    pub fn with_input(mut self, name: &str, dims: &[usize], dtype: &str) -> Self {
        self.info
            .shapes
            .insert(name.to_string(), Shape::from_slice(dims));
        self.info.dtypes.insert(name.to_string(), dtype.to_string());
        self.num_inputs += 1;
        self
    }

    pub fn with_f32_output(mut self, values: &[f32]) -> Self {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let tensor = Tensor::from_bytes(
            DType::F32,
            Shape::from_slice(&[values.len()]),
            Device::Cpu,
            Bytes::from(bytes),
        )
        .expect("output tensor");
        self.outputs.push(tensor);
        self
    }

    pub fn with_uncopyable_outputs(mut self, message: &str) -> Self {
        self.output_copy_error = Some(message.to_string());
        self
    }

    pub fn with_timing(mut self, mean_secs: f64) -> Self {
        self.mean_secs = Some(mean_secs);
        self
    }
}

impl GraphExecutor for RecordingExecutor {
    type Slot = Slot;

    fn input_info(&self) -> Result<InputInfo> {
        *self.info_queries.borrow_mut() += 1;
        Ok(self.info.clone())
    }

    fn set_input(&mut self, name: &str, tensor: Tensor) -> Result<()> {
        self.bound.push((name.to_string(), tensor));
        Ok(())
    }

    fn input(&self, index: usize) -> Result<Slot> {
        if index >= self.num_inputs {
            bail!("input index {index} out of range");
        }
        Ok(Slot::Input(index))
    }

    fn output(&self, index: usize) -> Result<Slot> {
        if index >= self.outputs.len() {
            bail!("output index {index} out of range");
        }
        self.output_fetches.borrow_mut().push(index);
        Ok(Slot::Output(index))
    }

    fn output_tensor(&self, index: usize) -> Result<Tensor> {
        if let Some(message) = &self.output_copy_error {
            bail!("{message}");
        }
        self.outputs.get(index).cloned().context("no such output")
    }

    fn num_inputs(&self) -> Result<usize> {
        Ok(self.num_inputs)
    }

    fn num_outputs(&self) -> Result<usize> {
        Ok(self.outputs.len())
    }

    fn run(&mut self) -> Result<()> {
        self.runs += 1;
        Ok(())
    }

    fn time_eval(&self, device: Device, config: &TimeEvalConfig, args: &[Slot]) -> Result<f64> {
        let mean = self.mean_secs.context("executor does not support timing")?;
        self.time_evals.borrow_mut().push(TimeEvalCall {
            device,
            config: config.clone(),
            args: args.to_vec(),
        });
        Ok(mean)
    }
}
