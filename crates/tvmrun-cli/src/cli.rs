use std::path::PathBuf;

use clap::Parser;
use tvmrun_runtime::{debug_enabled, NamedInput, DEBUG_ENV};

#[derive(Parser, Debug)]
#[command(
    name = "tvmrun",
    version,
    about = "Run or benchmark a compiled TVM graph executor library",
    after_help = "With no inputs the module is benchmarked and the mean latency is printed in ms."
)]
pub struct Cli {
    /// Compiled model library (e.g. libmodel.so)
    pub module_path: PathBuf,

    /// Input files as input_name:path
    #[arg(value_name = "NAME:PATH")]
    pub inputs: Vec<NamedInput>,

    /// Log level (RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log: String,

    /// Set to ON to print output 0 after inference
    #[arg(long, env = DEBUG_ENV, default_value = "OFF", hide_env_values = true)]
    pub debug: String,
}

impl Cli {
    pub fn debug_enabled(&self) -> bool {
        debug_enabled(Some(self.debug.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_only() {
        let cli = Cli::try_parse_from(["tvmrun", "libmodel.so"]).unwrap();
        assert_eq!(cli.module_path, PathBuf::from("libmodel.so"));
        assert!(cli.inputs.is_empty());
        assert_eq!(cli.log, "info");
    }

    #[test]
    fn named_inputs_are_parsed_in_order() {
        let cli =
            Cli::try_parse_from(["tvmrun", "libmodel.so", "x:a.bin", "y:dir/b:c.bin"]).unwrap();
        let got: Vec<_> = cli
            .inputs
            .iter()
            .map(|i| (i.name.as_str(), i.path.to_str().unwrap()))
            .collect();
        assert_eq!(got, vec![("x", "a.bin"), ("y", "dir/b:c.bin")]);
    }

    #[test]
    fn module_path_is_required() {
        assert!(Cli::try_parse_from(["tvmrun"]).is_err());
    }

    #[test]
    fn input_without_colon_is_rejected() {
        let err = Cli::try_parse_from(["tvmrun", "libmodel.so", "a.bin"]).unwrap_err();
        assert!(err.to_string().contains("input_name:input"));
    }

    #[test]
    fn debug_flag_needs_exact_on() {
        let cli = Cli::try_parse_from(["tvmrun", "m.so", "--debug", "ON"]).unwrap();
        assert!(cli.debug_enabled());
        let cli = Cli::try_parse_from(["tvmrun", "m.so", "--debug", "on"]).unwrap();
        assert!(!cli.debug_enabled());
    }
}
