use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseInputError {
    #[error("input format must be input_name:input, got `{0}`")]
    MissingSeparator(String),
}

/// One `name:path` pair from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedInput {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for NamedInput {
    type Err = ParseInputError;

    /// Splits at the first colon; the path keeps any further colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once(':')
            .ok_or_else(|| ParseInputError::MissingSeparator(s.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// Named inputs keyed by input name, kept in first-insertion order.
///
/// Inserting a name that is already present replaces its path in place.
#[derive(Clone, Debug, Default)]
pub struct NamedInputs {
    entries: Vec<NamedInput>,
}

impl NamedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, input: NamedInput) {
        match self.entries.iter_mut().find(|e| e.name == input.name) {
            Some(existing) => {
                warn!(
                    name = %input.name,
                    replaced = %existing.path.display(),
                    path = %input.path.display(),
                    "input given more than once, last path wins"
                );
                existing.path = input.path;
            }
            None => self.entries.push(input),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedInput> {
        self.entries.iter()
    }
}

impl FromIterator<NamedInput> for NamedInputs {
    fn from_iter<I: IntoIterator<Item = NamedInput>>(iter: I) -> Self {
        let mut inputs = Self::new();
        for input in iter {
            inputs.insert(input);
        }
        inputs
    }
}
