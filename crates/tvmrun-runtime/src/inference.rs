use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;
use tvmrun_core::GraphExecutor;

use crate::{load_inputs, NamedInputs, RunConfig};

const ROW_WIDTH: usize = 10;

/// Binds `inputs`, runs the executor once and, in debug mode, prints output 0.
pub fn run_inference<E: GraphExecutor, W: Write>(
    executor: &mut E,
    inputs: &NamedInputs,
    config: &RunConfig,
    out: &mut W,
) -> Result<()> {
    load_inputs(executor, inputs, config.device)?;

    info!("Running graph executor...");
    executor.run().context("graph executor run failed")?;

    if !config.debug {
        executor.output(0).context("failed to fetch output 0")?;
        return Ok(());
    }

    let output = executor
        .output_tensor(0)
        .context("failed to copy output 0")?;
    let values = output.to_f32_vec()?;
    write_output_rows(out, &values)?;
    Ok(())
}

/// Writes values in rows of ten, each prefixed with its index range.
/// A trailing partial row is not printed.
pub fn write_output_rows<W: Write>(out: &mut W, values: &[f32]) -> std::io::Result<()> {
    for (row, chunk) in values.chunks_exact(ROW_WIDTH).enumerate() {
        let start = row * ROW_WIDTH;
        write!(out, "[{:>5} - {:<5}]: ", start, start + ROW_WIDTH - 1)?;
        for v in chunk {
            write!(out, "{v:.3}, ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
