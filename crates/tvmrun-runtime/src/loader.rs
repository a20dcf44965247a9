use std::fs::File;
use std::io::Read;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::{debug, info};
use tvmrun_core::{Device, GraphExecutor, InputInfo, LoadError, Tensor};

use crate::{NamedInput, NamedInputs};

/// Loads every named input into a tensor and binds it to `executor`.
///
/// All inputs are validated and read before the first `set_input`, so a bad
/// file leaves the executor untouched.
pub fn load_inputs<E: GraphExecutor>(
    executor: &mut E,
    inputs: &NamedInputs,
    device: Device,
) -> Result<()> {
    let info = executor
        .input_info()
        .context("failed to query executor input info")?;

    let tensors = inputs
        .iter()
        .map(|input| Ok((input.name.as_str(), load_tensor(&info, input, device)?)))
        .collect::<Result<Vec<_>, LoadError>>()?;

    for (name, tensor) in tensors {
        debug!(
            name,
            dtype = %tensor.desc.dtype,
            shape = %tensor.desc.shape,
            bytes = tensor.byte_len(),
            "binding input"
        );
        executor
            .set_input(name, tensor)
            .with_context(|| format!("failed to set input `{name}`"))?;
    }
    info!(count = inputs.len(), "inputs bound");
    Ok(())
}

/// Validates one input file against the executor's declared shape and dtype
/// and reads it verbatim into a tensor.
pub fn load_tensor(
    info: &InputInfo,
    input: &NamedInput,
    device: Device,
) -> Result<Tensor, LoadError> {
    let path = &input.path;
    let meta = std::fs::metadata(path).map_err(|_| LoadError::MissingFile {
        path: path.clone(),
    })?;
    if !meta.is_file() {
        return Err(LoadError::NotAFile { path: path.clone() });
    }

    let shape = info.shape(&input.name)?.clone();
    let dtype = info.dtype(&input.name)?;
    let expected = shape.numel() * dtype.byte_size();

    let buffer = read_file(input)?;
    if buffer.len() != expected {
        return Err(LoadError::ByteLengthMismatch {
            name: input.name.clone(),
            path: path.clone(),
            expected,
            actual: buffer.len(),
        });
    }

    Tensor::from_bytes(dtype, shape, device, Bytes::from(buffer))
}

fn read_file(input: &NamedInput) -> Result<Vec<u8>, LoadError> {
    let io_err = |source: std::io::Error| LoadError::Io {
        path: input.path.clone(),
        source,
    };
    let mut file = File::open(&input.path).map_err(io_err)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).map_err(io_err)?;
    Ok(buffer)
}
