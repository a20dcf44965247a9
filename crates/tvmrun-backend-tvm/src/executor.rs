use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use bytes::Bytes;
use tracing::{debug, info};
use tvmrun_core::{
    DType, Device, GraphExecutor, InputInfo, Shape, Tensor, TimeEvalConfig,
};

use crate::ffi::{DLDataType, DLDevice};
use crate::packed::{Arg, Module, NDArray, Object, PackedFunc, RetValue};

/// A graph executor module created by a compiled library's factory function.
pub struct TvmExecutor {
    get_input_info: PackedFunc,
    set_input: PackedFunc,
    get_input: PackedFunc,
    get_output: PackedFunc,
    get_num_inputs: PackedFunc,
    get_num_outputs: PackedFunc,
    run: PackedFunc,
    // Dropped after the functions that belong to it.
    module: Module,
}

impl TvmExecutor {
    pub(crate) fn load(path: &Path, factory: &str, device: Device) -> Result<Self> {
        let path_str = path
            .to_str()
            .with_context(|| format!("module path {} is not valid UTF-8", path.display()))?;
        let lib = Module::load_from_file(path_str)
            .with_context(|| format!("failed to load module {}", path.display()))?;

        let module = lib
            .function(factory)
            .with_context(|| format!("module {} has no `{factory}` factory", path.display()))?
            .call(&[Arg::Device(dl_device(device))])
            .with_context(|| format!("factory `{factory}` failed"))?
            .into_module()?;
        info!(path = %path.display(), factory, ?device, "graph executor created");

        let func = |name: &str| {
            module
                .function(name)
                .with_context(|| format!("graph executor has no `{name}` function"))
        };

        Ok(Self {
            get_input_info: func("get_input_info")?,
            set_input: func("set_input")?,
            get_input: func("get_input")?,
            get_output: func("get_output")?,
            get_num_inputs: func("get_num_inputs")?,
            get_num_outputs: func("get_num_outputs")?,
            run: func("run")?,
            module,
        })
    }
}

impl GraphExecutor for TvmExecutor {
    type Slot = NDArray;

    fn input_info(&self) -> Result<InputInfo> {
        let map = self.get_input_info.call(&[])?.into_object()?;
        let containers = Containers::new()?;

        let mut info = InputInfo::default();
        for (key, value) in containers.map_items(&map)? {
            let value = value.into_object()?;
            match containers.string(key)?.as_str() {
                "shape" => {
                    for (name, shape) in containers.map_items(&value)? {
                        let shape = containers.shape(&shape.into_object()?)?;
                        info.shapes.insert(containers.string(name)?, shape);
                    }
                }
                "dtype" => {
                    for (name, dtype) in containers.map_items(&value)? {
                        info.dtypes
                            .insert(containers.string(name)?, containers.string(dtype)?);
                    }
                }
                other => debug!(key = other, "ignoring input info entry"),
            }
        }
        Ok(info)
    }

    fn set_input(&mut self, name: &str, tensor: Tensor) -> Result<()> {
        let shape = tensor
            .desc
            .shape
            .dims()
            .iter()
            .map(|d| i64::try_from(*d))
            .collect::<Result<Vec<_>, _>>()?;
        let mut array = NDArray::empty(
            &shape,
            dl_dtype(tensor.desc.dtype),
            dl_device(tensor.desc.device),
        )?;
        array.copy_from_bytes(tensor.as_bytes())?;
        self.set_input.call(&[Arg::Str(name), Arg::Array(&array)])?;
        Ok(())
    }

    fn input(&self, index: usize) -> Result<NDArray> {
        self.get_input
            .call(&[Arg::Int(index as i64)])?
            .into_ndarray()
    }

    fn output(&self, index: usize) -> Result<NDArray> {
        self.get_output
            .call(&[Arg::Int(index as i64)])?
            .into_ndarray()
    }

    fn output_tensor(&self, index: usize) -> Result<Tensor> {
        let array = self.output(index)?;
        let dl = array.dtype();
        let Some(dtype) = DType::from_dlpack(dl.code, dl.bits, dl.lanes) else {
            bail!(
                "output {index} has unsupported dtype (code {}, bits {}, lanes {})",
                dl.code,
                dl.bits,
                dl.lanes
            );
        };
        let dims = array
            .shape()
            .into_iter()
            .map(usize::try_from)
            .collect::<Result<Vec<_>, _>>()
            .context("output has a negative dimension")?;
        let shape = Shape::from_slice(&dims);
        let bytes = array.copy_to_bytes(shape.numel() * dtype.byte_size())?;
        Ok(Tensor::from_bytes(dtype, shape, Device::Cpu, Bytes::from(bytes))?)
    }

    fn num_inputs(&self) -> Result<usize> {
        Ok(usize::try_from(self.get_num_inputs.call(&[])?.into_int()?)?)
    }

    fn num_outputs(&self) -> Result<usize> {
        Ok(usize::try_from(self.get_num_outputs.call(&[])?.into_int()?)?)
    }

    fn run(&mut self) -> Result<()> {
        self.run.call(&[])?;
        Ok(())
    }

    fn time_eval(&self, device: Device, config: &TimeEvalConfig, args: &[NDArray]) -> Result<f64> {
        let evaluator = PackedFunc::global("runtime.RPCTimeEvaluator")?
            .call(&[
                Arg::Module(&self.module),
                Arg::Str(&config.entry),
                Arg::Int(i64::from(device.kind_code())),
                Arg::Int(i64::from(device.index())),
                Arg::Int(i64::from(config.number)),
                Arg::Int(i64::from(config.repeat)),
                Arg::Int(i64::from(config.min_repeat_ms)),
                Arg::Str(&config.preproc),
            ])?
            .into_func()
            .context("runtime.RPCTimeEvaluator did not return a function")?;

        let args: Vec<Arg<'_>> = args.iter().map(Arg::Array).collect();
        let results = evaluator.call(&args)?.into_bytes()?;
        ensure!(
            results.len() >= 8,
            "time evaluator returned {} bytes, expected at least one f64",
            results.len()
        );
        let mut mean = [0u8; 8];
        mean.copy_from_slice(&results[..8]);
        Ok(f64::from_ne_bytes(mean))
    }
}

/// Registered container accessors used to walk maps, arrays and shape tuples.
struct Containers {
    map_items: PackedFunc,
    array_size: PackedFunc,
    array_get: PackedFunc,
    shape_size: PackedFunc,
    shape_elem: PackedFunc,
    ffi_string: PackedFunc,
}

impl Containers {
    fn new() -> Result<Self> {
        Ok(Self {
            map_items: PackedFunc::global("runtime.MapItems")?,
            array_size: PackedFunc::global("runtime.ArraySize")?,
            array_get: PackedFunc::global("runtime.ArrayGetItem")?,
            shape_size: PackedFunc::global("runtime.GetShapeTupleSize")?,
            shape_elem: PackedFunc::global("runtime.GetShapeTupleElem")?,
            ffi_string: PackedFunc::global("runtime.GetFFIString")?,
        })
    }

    /// Key/value pairs of a map; `MapItems` flattens them into one array.
    fn map_items(&self, map: &Object) -> Result<Vec<(RetValue, RetValue)>> {
        let items = self.map_items.call(&[Arg::Object(map)])?.into_object()?;
        let len = self.array_size.call(&[Arg::Object(&items)])?.into_int()?;
        ensure!(len % 2 == 0, "map items array has odd length {len}");

        let mut pairs = Vec::with_capacity(len as usize / 2);
        for i in (0..len).step_by(2) {
            let key = self.array_get.call(&[Arg::Object(&items), Arg::Int(i)])?;
            let value = self.array_get.call(&[Arg::Object(&items), Arg::Int(i + 1)])?;
            pairs.push((key, value));
        }
        Ok(pairs)
    }

    fn string(&self, value: RetValue) -> Result<String> {
        match value {
            RetValue::Str(s) => Ok(s),
            RetValue::Object(obj) => match self.ffi_string.call(&[Arg::Object(&obj)])? {
                RetValue::Str(s) => Ok(s),
                _ => bail!("runtime.GetFFIString did not return a string"),
            },
            _ => bail!("expected a string value"),
        }
    }

    fn shape(&self, tuple: &Object) -> Result<Shape> {
        let ndim = self.shape_size.call(&[Arg::Object(tuple)])?.into_int()?;
        let dims = (0..ndim)
            .map(|i| {
                let d = self
                    .shape_elem
                    .call(&[Arg::Object(tuple), Arg::Int(i)])?
                    .into_int()?;
                usize::try_from(d).with_context(|| format!("negative dimension {d}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Shape::from_slice(&dims))
    }
}

fn dl_device(device: Device) -> DLDevice {
    DLDevice {
        device_type: device.kind_code(),
        device_id: device.index(),
    }
}

fn dl_dtype(dtype: DType) -> DLDataType {
    DLDataType {
        code: dtype.code() as u8,
        bits: dtype.bits(),
        lanes: dtype.lanes(),
    }
}
