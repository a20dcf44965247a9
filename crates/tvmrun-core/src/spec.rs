use std::collections::HashMap;

use crate::{DType, LoadError, Shape};

/// Per-input metadata reported by a graph executor (`get_input_info`).
#[derive(Clone, Debug, Default)]
pub struct InputInfo {
    pub shapes: HashMap<String, Shape>,
    pub dtypes: HashMap<String, String>,
}

impl InputInfo {
    pub fn shape(&self, name: &str) -> Result<&Shape, LoadError> {
        self.shapes
            .get(name)
            .ok_or_else(|| LoadError::UnknownInput(name.to_string()))
    }

    /// Declared dtype of `name`, resolved through the fixed dtype table.
    pub fn dtype(&self, name: &str) -> Result<DType, LoadError> {
        self.dtypes
            .get(name)
            .ok_or_else(|| LoadError::UnknownInput(name.to_string()))?
            .parse()
    }
}
