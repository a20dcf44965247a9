//! Stand-in executor for builds without the `tvm` feature. It cannot be
//! constructed, so every method is unreachable.

use std::convert::Infallible;

use anyhow::Result;
use tvmrun_core::{Device, GraphExecutor, InputInfo, Tensor, TimeEvalConfig};

pub enum TvmExecutor {}

impl GraphExecutor for TvmExecutor {
    type Slot = Infallible;

    fn input_info(&self) -> Result<InputInfo> {
        match *self {}
    }

    fn set_input(&mut self, _name: &str, _tensor: Tensor) -> Result<()> {
        match *self {}
    }

    fn input(&self, _index: usize) -> Result<Infallible> {
        match *self {}
    }

    fn output(&self, _index: usize) -> Result<Infallible> {
        match *self {}
    }

    fn output_tensor(&self, _index: usize) -> Result<Tensor> {
        match *self {}
    }

    fn num_inputs(&self) -> Result<usize> {
        match *self {}
    }

    fn num_outputs(&self) -> Result<usize> {
        match *self {}
    }

    fn run(&mut self) -> Result<()> {
        match *self {}
    }

    fn time_eval(&self, _: Device, _: &TimeEvalConfig, _: &[Infallible]) -> Result<f64> {
        match *self {}
    }
}
