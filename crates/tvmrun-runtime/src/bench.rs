use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tvmrun_core::{Device, GraphExecutor, TimeEvalConfig};

/// Times the executor with its own input and output slots as arguments and
/// prints the mean latency in milliseconds. Returns the mean in seconds.
pub fn run_benchmark<E: GraphExecutor, W: Write>(
    executor: &E,
    device: Device,
    config: &TimeEvalConfig,
    out: &mut W,
) -> Result<f64> {
    let num_inputs = executor.num_inputs().context("failed to query input count")?;
    let num_outputs = executor
        .num_outputs()
        .context("failed to query output count")?;
    debug!(num_inputs, num_outputs, "collecting executor slots");

    let mut args = Vec::with_capacity(num_inputs + num_outputs);
    for i in 0..num_inputs {
        args.push(executor.input(i).with_context(|| format!("failed to get input {i}"))?);
    }
    for i in 0..num_outputs {
        args.push(
            executor
                .output(i)
                .with_context(|| format!("failed to get output {i}"))?,
        );
    }

    info!(
        entry = %config.entry,
        number = config.number,
        repeat = config.repeat,
        min_repeat_ms = config.min_repeat_ms,
        "timing graph executor"
    );
    let mean_secs = executor
        .time_eval(device, config, &args)
        .context("time evaluation failed")?;

    writeln!(out, "{}", mean_secs * 1000.0)?;
    Ok(mean_secs)
}
