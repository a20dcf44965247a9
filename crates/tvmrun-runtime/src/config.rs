use tvmrun_core::{Device, TimeEvalConfig};

/// Environment variable that enables printing of output values.
pub const DEBUG_ENV: &str = "cpp_bench_debug";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub device: Device,
    /// Print output 0 after inference.
    pub debug: bool,
    pub time_eval: TimeEvalConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            debug: false,
            time_eval: TimeEvalConfig::default(),
        }
    }
}

impl RunConfig {
    /// Default settings with `debug` taken from `cpp_bench_debug`.
    pub fn from_env() -> Self {
        Self {
            debug: debug_enabled(std::env::var(DEBUG_ENV).ok().as_deref()),
            ..Self::default()
        }
    }
}

/// Only the exact value `ON` enables debug output.
pub fn debug_enabled(value: Option<&str>) -> bool {
    value == Some("ON")
}
