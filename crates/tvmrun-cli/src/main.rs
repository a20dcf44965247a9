mod cli;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;
use tvmrun_backend_tvm::TvmRuntime;
use tvmrun_core::{ModelArtifact, Runtime};
use tvmrun_runtime::{dispatch, NamedInputs, RunConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    let config = RunConfig {
        debug: cli.debug_enabled(),
        ..RunConfig::default()
    };
    let inputs: NamedInputs = cli.inputs.into_iter().collect();

    let runtime = TvmRuntime::new();
    let artifact = ModelArtifact::shared_library(&cli.module_path);
    let mut executor = runtime.load(&artifact, config.device)?;
    tracing::info!(
        runtime = runtime.name(),
        module = %cli.module_path.display(),
        inputs = inputs.len(),
        "module loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mode = dispatch(&mut executor, &inputs, &config, &mut out)?;
    out.flush()?;
    tracing::debug!(?mode, "done");
    Ok(())
}

fn init_tracing(log: &str) -> Result<()> {
    std::env::set_var("RUST_LOG", log);
    let filter = EnvFilter::try_from_default_env()
        .with_context(|| format!("invalid log filter `{log}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
