//! Raw declarations for the TVM C runtime API (`c_runtime_api.h`) and the
//! DLPack structs it exchanges.
//!
//! # Safety
//!
//! Every function here is unsafe FFI. Handles must come from the matching
//! allocation call and be freed exactly once. Strings and byte arrays returned
//! through `TVMValue` live in thread-local storage owned by the runtime and are
//! only valid until the next call on the same thread.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

use anyhow::{anyhow, Result};

pub type TVMModuleHandle = *mut c_void;
pub type TVMFunctionHandle = *mut c_void;
pub type TVMObjectHandle = *mut c_void;
pub type TVMArrayHandle = *mut DLTensor;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DLDevice {
    pub device_type: c_int,
    pub device_id: c_int,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DLDataType {
    pub code: u8,
    pub bits: u8,
    pub lanes: u16,
}

#[repr(C)]
#[derive(Debug)]
#[allow(dead_code)]
pub struct DLTensor {
    pub data: *mut c_void,
    pub device: DLDevice,
    pub ndim: c_int,
    pub dtype: DLDataType,
    pub shape: *mut i64,
    pub strides: *mut i64,
    pub byte_offset: u64,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
pub union TVMValue {
    pub v_int64: i64,
    pub v_float64: f64,
    pub v_handle: *mut c_void,
    pub v_str: *const c_char,
    pub v_type: DLDataType,
    pub v_device: DLDevice,
}

#[repr(C)]
pub struct TVMByteArray {
    pub data: *const c_char,
    pub size: usize,
}

// TVMArgTypeCode
pub const K_DL_INT: c_int = 0;
pub const K_TVM_NULLPTR: c_int = 4;
pub const K_DL_DEVICE: c_int = 6;
pub const K_TVM_DL_TENSOR_HANDLE: c_int = 7;
pub const K_TVM_OBJECT_HANDLE: c_int = 8;
pub const K_TVM_MODULE_HANDLE: c_int = 9;
pub const K_TVM_PACKED_FUNC_HANDLE: c_int = 10;
pub const K_TVM_STR: c_int = 11;
pub const K_TVM_BYTES: c_int = 12;
pub const K_TVM_NDARRAY_HANDLE: c_int = 13;

#[link(name = "tvm_runtime")]
extern "C" {
    pub fn TVMGetLastError() -> *const c_char;

    pub fn TVMModLoadFromFile(
        file_name: *const c_char,
        format: *const c_char,
        out: *mut TVMModuleHandle,
    ) -> c_int;
    pub fn TVMModGetFunction(
        module: TVMModuleHandle,
        func_name: *const c_char,
        query_imports: c_int,
        out: *mut TVMFunctionHandle,
    ) -> c_int;
    pub fn TVMModFree(module: TVMModuleHandle) -> c_int;

    pub fn TVMFuncGetGlobal(name: *const c_char, out: *mut TVMFunctionHandle) -> c_int;
    pub fn TVMFuncCall(
        func: TVMFunctionHandle,
        arg_values: *mut TVMValue,
        type_codes: *mut c_int,
        num_args: c_int,
        ret_val: *mut TVMValue,
        ret_type_code: *mut c_int,
    ) -> c_int;
    pub fn TVMFuncFree(func: TVMFunctionHandle) -> c_int;

    pub fn TVMArrayAlloc(
        shape: *const i64,
        ndim: c_int,
        dtype_code: c_int,
        dtype_bits: c_int,
        dtype_lanes: c_int,
        device_type: c_int,
        device_id: c_int,
        out: *mut TVMArrayHandle,
    ) -> c_int;
    pub fn TVMArrayCopyFromBytes(handle: TVMArrayHandle, data: *mut c_void, nbytes: usize)
        -> c_int;
    pub fn TVMArrayCopyToBytes(handle: TVMArrayHandle, data: *mut c_void, nbytes: usize) -> c_int;
    pub fn TVMArrayFree(handle: TVMArrayHandle) -> c_int;

    pub fn TVMObjectFree(obj: TVMObjectHandle) -> c_int;
}

/// Turns a non-zero TVM status into an error carrying `TVMGetLastError`.
pub fn check(status: c_int, call: &str) -> Result<()> {
    if status == 0 {
        return Ok(());
    }
    // SAFETY: TVMGetLastError returns a NUL-terminated thread-local string.
    let msg = unsafe {
        let ptr = TVMGetLastError();
        if ptr.is_null() {
            String::from("<no error message>")
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    };
    Err(anyhow!("{call} failed ({status}): {msg}"))
}
