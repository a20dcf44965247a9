use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use smallvec::SmallVec;

use crate::LoadError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
}

impl Device {
    /// DLPack `DLDeviceType` code.
    pub fn kind_code(&self) -> i32 {
        match self {
            Device::Cpu => 1,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            Device::Cpu => 0,
        }
    }
}

/// DLPack `DLDataTypeCode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DTypeCode {
    Int = 0,
    UInt = 1,
    Float = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    F32,
    F16,
    I8,
    U8,
    I16,
    U16,
}

const DTYPE_TABLE: [(&str, DType); 6] = [
    ("float32", DType::F32),
    ("float16", DType::F16),
    ("int8", DType::I8),
    ("uint8", DType::U8),
    ("int16", DType::I16),
    ("uint16", DType::U16),
];

impl DType {
    pub fn code(self) -> DTypeCode {
        match self {
            DType::F32 | DType::F16 => DTypeCode::Float,
            DType::I8 | DType::I16 => DTypeCode::Int,
            DType::U8 | DType::U16 => DTypeCode::UInt,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            DType::F32 => 32,
            DType::F16 | DType::I16 | DType::U16 => 16,
            DType::I8 | DType::U8 => 8,
        }
    }

    pub fn lanes(self) -> u16 {
        1
    }

    pub fn byte_size(self) -> usize {
        usize::from(self.bits() / 8)
    }

    pub fn name(self) -> &'static str {
        DTYPE_TABLE
            .iter()
            .find(|(_, dtype)| *dtype == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Inverse of `(code, bits, lanes)`; `None` outside the supported set.
    pub fn from_dlpack(code: u8, bits: u8, lanes: u16) -> Option<Self> {
        if lanes != 1 {
            return None;
        }
        DTYPE_TABLE
            .iter()
            .map(|(_, dtype)| *dtype)
            .find(|dtype| dtype.code() as u8 == code && dtype.bits() == bits)
    }
}

impl FromStr for DType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DTYPE_TABLE
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, dtype)| *dtype)
            .ok_or_else(|| LoadError::UnsupportedDtype(s.to_string()))
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape(pub SmallVec<[usize; 6]>);

impl Shape {
    pub fn from_slice(d: &[usize]) -> Self {
        Self(d.iter().copied().collect())
    }
    /// Product of all dimensions; 1 for a scalar, 0 if any dimension is 0.
    pub fn numel(&self) -> usize {
        self.0.iter().product::<usize>()
    }
    pub fn dims(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_slice())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorDesc {
    pub dtype: DType,
    pub shape: Shape,
    pub device: Device,
}

impl TensorDesc {
    pub fn byte_len(&self) -> usize {
        self.shape.numel() * self.dtype.byte_size()
    }
}

/// A dense tensor staged in host memory, ready to be copied onto `desc.device`.
#[derive(Clone, Debug)]
pub struct Tensor {
    pub desc: TensorDesc,
    bytes: Bytes,
}

impl Tensor {
    /// Wraps raw bytes without conversion. The buffer must match the descriptor exactly.
    pub fn from_bytes(
        dtype: DType,
        shape: Shape,
        device: Device,
        bytes: Bytes,
    ) -> Result<Self, LoadError> {
        let desc = TensorDesc {
            dtype,
            shape,
            device,
        };
        let expected = desc.byte_len();
        if bytes.len() != expected {
            return Err(LoadError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { desc, bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Reinterprets a float32 tensor in native byte order.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>, LoadError> {
        if self.desc.dtype != DType::F32 {
            return Err(LoadError::NotFloat32(self.desc.dtype));
        }
        Ok(self
            .bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}
