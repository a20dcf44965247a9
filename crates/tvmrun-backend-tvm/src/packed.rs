//! Owning wrappers over TVM runtime handles and the packed-function calling
//! convention.

use std::ffi::{CStr, CString};
use std::os::raw::c_int;
use std::ptr;

use anyhow::{bail, Context, Result};

use crate::ffi::{self, DLDevice, TVMValue};

pub struct Module {
    handle: ffi::TVMModuleHandle,
}

impl Module {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let file_name = CString::new(path).context("module path contains NUL")?;
        let format = CString::default();
        let mut handle = ptr::null_mut();
        // SAFETY: both strings outlive the call and `handle` is a valid out pointer.
        ffi::check(
            unsafe { ffi::TVMModLoadFromFile(file_name.as_ptr(), format.as_ptr(), &mut handle) },
            "TVMModLoadFromFile",
        )?;
        Ok(Self { handle })
    }

    pub fn function(&self, name: &str) -> Result<PackedFunc> {
        let c_name = CString::new(name)?;
        let mut handle = ptr::null_mut();
        // SAFETY: `self.handle` is a live module handle.
        ffi::check(
            unsafe { ffi::TVMModGetFunction(self.handle, c_name.as_ptr(), 0, &mut handle) },
            "TVMModGetFunction",
        )?;
        if handle.is_null() {
            bail!("module has no function `{name}`");
        }
        Ok(PackedFunc { handle })
    }

    pub fn handle(&self) -> ffi::TVMModuleHandle {
        self.handle
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        // SAFETY: the handle was produced by the runtime and is freed once.
        unsafe { ffi::TVMModFree(self.handle) };
    }
}

pub struct PackedFunc {
    handle: ffi::TVMFunctionHandle,
}

impl PackedFunc {
    /// Looks up a function in the runtime's global registry.
    pub fn global(name: &str) -> Result<Self> {
        let c_name = CString::new(name)?;
        let mut handle = ptr::null_mut();
        // SAFETY: `c_name` outlives the call and `handle` is a valid out pointer.
        ffi::check(
            unsafe { ffi::TVMFuncGetGlobal(c_name.as_ptr(), &mut handle) },
            "TVMFuncGetGlobal",
        )?;
        if handle.is_null() {
            bail!("global function `{name}` is not registered");
        }
        Ok(Self { handle })
    }

    pub fn call(&self, args: &[Arg<'_>]) -> Result<RetValue> {
        // Keep C strings alive until the call returns.
        let strings = args
            .iter()
            .filter_map(|a| match a {
                Arg::Str(s) => Some(CString::new(*s)),
                _ => None,
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut strings = strings.iter();

        let mut values = Vec::with_capacity(args.len());
        let mut codes = Vec::with_capacity(args.len());
        for arg in args {
            let (value, code) = match arg {
                Arg::Int(v) => (TVMValue { v_int64: *v }, ffi::K_DL_INT),
                Arg::Str(_) => {
                    let s = strings.next().context("argument string missing")?;
                    (TVMValue { v_str: s.as_ptr() }, ffi::K_TVM_STR)
                }
                Arg::Device(d) => (TVMValue { v_device: *d }, ffi::K_DL_DEVICE),
                Arg::Array(a) => (
                    TVMValue {
                        v_handle: a.handle.cast(),
                    },
                    ffi::K_TVM_DL_TENSOR_HANDLE,
                ),
                Arg::Module(m) => (
                    TVMValue {
                        v_handle: m.handle(),
                    },
                    ffi::K_TVM_MODULE_HANDLE,
                ),
                Arg::Object(o) => (TVMValue { v_handle: o.handle }, ffi::K_TVM_OBJECT_HANDLE),
            };
            values.push(value);
            codes.push(code);
        }

        let mut ret = TVMValue { v_int64: 0 };
        let mut ret_code: c_int = ffi::K_TVM_NULLPTR;
        // SAFETY: values/codes have `args.len()` entries and every handle is live.
        ffi::check(
            unsafe {
                ffi::TVMFuncCall(
                    self.handle,
                    values.as_mut_ptr(),
                    codes.as_mut_ptr(),
                    args.len() as c_int,
                    &mut ret,
                    &mut ret_code,
                )
            },
            "TVMFuncCall",
        )?;
        // SAFETY: `ret_code` tells which union field the runtime wrote.
        unsafe { RetValue::take(ret, ret_code) }
    }
}

impl Drop for PackedFunc {
    fn drop(&mut self) {
        // SAFETY: the handle was produced by the runtime and is freed once.
        unsafe { ffi::TVMFuncFree(self.handle) };
    }
}

/// A reference-counted runtime object (maps, arrays, strings, shape tuples).
pub struct Object {
    handle: ffi::TVMObjectHandle,
}

impl Drop for Object {
    fn drop(&mut self) {
        // SAFETY: the runtime handed us one reference, released here.
        unsafe { ffi::TVMObjectFree(self.handle) };
    }
}

/// A runtime-managed n-dimensional array.
pub struct NDArray {
    handle: ffi::TVMArrayHandle,
}

impl NDArray {
    pub fn empty(shape: &[i64], dtype: ffi::DLDataType, device: DLDevice) -> Result<Self> {
        let mut handle = ptr::null_mut();
        // SAFETY: `shape` has `shape.len()` entries and `handle` is a valid out pointer.
        ffi::check(
            unsafe {
                ffi::TVMArrayAlloc(
                    shape.as_ptr(),
                    shape.len() as c_int,
                    c_int::from(dtype.code),
                    c_int::from(dtype.bits),
                    c_int::from(dtype.lanes),
                    device.device_type,
                    device.device_id,
                    &mut handle,
                )
            },
            "TVMArrayAlloc",
        )?;
        Ok(Self { handle })
    }

    fn tensor(&self) -> &ffi::DLTensor {
        // SAFETY: the handle points at a DLTensor kept alive by this array.
        unsafe { &*self.handle }
    }

    pub fn shape(&self) -> Vec<i64> {
        let t = self.tensor();
        if t.ndim == 0 || t.shape.is_null() {
            return Vec::new();
        }
        // SAFETY: `shape` holds `ndim` entries.
        unsafe { std::slice::from_raw_parts(t.shape, t.ndim as usize) }.to_vec()
    }

    pub fn dtype(&self) -> ffi::DLDataType {
        self.tensor().dtype
    }

    pub fn copy_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        // SAFETY: the runtime only reads `bytes.len()` bytes from the pointer.
        ffi::check(
            unsafe {
                ffi::TVMArrayCopyFromBytes(
                    self.handle,
                    bytes.as_ptr().cast_mut().cast(),
                    bytes.len(),
                )
            },
            "TVMArrayCopyFromBytes",
        )
    }

    pub fn copy_to_bytes(&self, nbytes: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; nbytes];
        // SAFETY: `buf` has room for `nbytes` bytes.
        ffi::check(
            unsafe { ffi::TVMArrayCopyToBytes(self.handle, buf.as_mut_ptr().cast(), nbytes) },
            "TVMArrayCopyToBytes",
        )?;
        Ok(buf)
    }
}

impl Drop for NDArray {
    fn drop(&mut self) {
        // SAFETY: the handle was produced by the runtime and is freed once.
        unsafe { ffi::TVMArrayFree(self.handle) };
    }
}

pub enum Arg<'a> {
    Int(i64),
    Str(&'a str),
    Device(DLDevice),
    Array(&'a NDArray),
    Module(&'a Module),
    Object(&'a Object),
}

pub enum RetValue {
    Null,
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Module(Module),
    Func(PackedFunc),
    Object(Object),
    NDArray(NDArray),
}

impl RetValue {
    /// Takes ownership of a value written by `TVMFuncCall`, copying out
    /// thread-local string and byte payloads.
    ///
    /// # Safety
    ///
    /// `code` must describe the field of `value` the runtime populated.
    unsafe fn take(value: TVMValue, code: c_int) -> Result<Self> {
        Ok(match code {
            ffi::K_TVM_NULLPTR => RetValue::Null,
            ffi::K_DL_INT => RetValue::Int(value.v_int64),
            ffi::K_TVM_STR => {
                RetValue::Str(CStr::from_ptr(value.v_str).to_string_lossy().into_owned())
            }
            ffi::K_TVM_BYTES => {
                let arr = &*(value.v_handle as *const ffi::TVMByteArray);
                let data = std::slice::from_raw_parts(arr.data.cast::<u8>(), arr.size);
                RetValue::Bytes(data.to_vec())
            }
            ffi::K_TVM_MODULE_HANDLE => RetValue::Module(Module {
                handle: value.v_handle,
            }),
            ffi::K_TVM_PACKED_FUNC_HANDLE => RetValue::Func(PackedFunc {
                handle: value.v_handle,
            }),
            ffi::K_TVM_OBJECT_HANDLE => RetValue::Object(Object {
                handle: value.v_handle,
            }),
            ffi::K_TVM_NDARRAY_HANDLE => RetValue::NDArray(NDArray {
                handle: value.v_handle.cast(),
            }),
            other => bail!("unsupported return type code {other}"),
        })
    }

    pub fn into_int(self) -> Result<i64> {
        match self {
            RetValue::Int(v) => Ok(v),
            _ => bail!("expected an integer return value"),
        }
    }

    pub fn into_module(self) -> Result<Module> {
        match self {
            RetValue::Module(m) => Ok(m),
            _ => bail!("expected a module return value"),
        }
    }

    pub fn into_func(self) -> Result<PackedFunc> {
        match self {
            RetValue::Func(f) => Ok(f),
            _ => bail!("expected a packed function return value"),
        }
    }

    pub fn into_object(self) -> Result<Object> {
        match self {
            RetValue::Object(o) => Ok(o),
            _ => bail!("expected an object return value"),
        }
    }

    pub fn into_ndarray(self) -> Result<NDArray> {
        match self {
            RetValue::NDArray(a) => Ok(a),
            _ => bail!("expected an NDArray return value"),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            RetValue::Bytes(b) => Ok(b),
            RetValue::Str(s) => Ok(s.into_bytes()),
            _ => bail!("expected a bytes return value"),
        }
    }
}
