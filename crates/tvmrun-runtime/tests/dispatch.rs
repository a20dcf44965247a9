mod support;

use anyhow::Result;
use support::{RecordingExecutor, Slot};
use tvmrun_core::{Device, LoadError, TimeEvalConfig};
use tvmrun_runtime::{dispatch, Mode, NamedInput, NamedInputs, RunConfig};

fn debug_config() -> RunConfig {
    RunConfig {
        debug: true,
        ..RunConfig::default()
    }
}

#[test]
fn no_inputs_take_the_benchmark_path() -> Result<()> {
    let mut exec = RecordingExecutor::default()
        .with_input("x", &[1, 4], "float32")
        .with_input("y", &[1], "int8")
        .with_f32_output(&[0.0; 4])
        .with_timing(0.0125);
    let mut out = Vec::new();

    let mode = dispatch(&mut exec, &NamedInputs::new(), &RunConfig::default(), &mut out)?;

    assert_eq!(mode, Mode::Benchmark);
    assert_eq!(exec.runs, 0);
    assert!(exec.bound.is_empty());
    assert_eq!(*exec.info_queries.borrow(), 0);

    let text = String::from_utf8(out)?;
    assert_eq!(text.lines().count(), 1);
    let ms: f64 = text.trim().parse()?;
    assert!((ms - 12.5).abs() < 1e-9);
    Ok(())
}

#[test]
fn benchmark_passes_inputs_then_outputs_with_fixed_protocol() -> Result<()> {
    let mut exec = RecordingExecutor::default()
        .with_input("a", &[1], "uint8")
        .with_input("b", &[1], "uint8")
        .with_f32_output(&[1.0])
        .with_timing(0.002);
    let mut out = Vec::new();

    dispatch(&mut exec, &NamedInputs::new(), &RunConfig::default(), &mut out)?;

    let calls = exec.time_evals.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].device, Device::Cpu);
    assert_eq!(calls[0].config, TimeEvalConfig::default());
    assert_eq!(
        calls[0].args,
        vec![Slot::Input(0), Slot::Input(1), Slot::Output(0)]
    );
    Ok(())
}

#[test]
fn timing_failure_is_fatal() {
    let mut exec = RecordingExecutor::default().with_f32_output(&[1.0]);
    let mut out = Vec::new();

    let err = dispatch(&mut exec, &NamedInputs::new(), &RunConfig::default(), &mut out)
        .unwrap_err();
    assert!(format!("{err:#}").contains("does not support timing"));
    assert!(out.is_empty());
}

#[test]
fn inference_prints_two_rows_for_23_outputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("x.bin");
    std::fs::write(&path, [0u8; 16])?;

    let values: Vec<f32> = (0..23).map(|i| i as f32).collect();
    let mut exec = RecordingExecutor::default()
        .with_input("x", &[4], "float32")
        .with_f32_output(&values);
    let inputs: NamedInputs = [NamedInput {
        name: "x".to_string(),
        path,
    }]
    .into_iter()
    .collect();
    let mut out = Vec::new();

    let mode = dispatch(&mut exec, &inputs, &debug_config(), &mut out)?;

    assert_eq!(mode, Mode::Inference);
    assert_eq!(exec.runs, 1);
    assert_eq!(exec.bound.len(), 1);
    assert!(exec.time_evals.borrow().is_empty());

    let text = String::from_utf8(out)?;
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[    0 - 9    ]: 0.000, 1.000, "));
    assert!(lines[1].starts_with("[   10 - 19   ]: 10.000, "));
    assert!(lines[1].ends_with("19.000, "));
    assert!(!text.contains("20.000"));
    Ok(())
}

#[test]
fn inference_is_silent_without_debug() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("x.bin");
    std::fs::write(&path, [7u8; 2])?;

    let mut exec = RecordingExecutor::default()
        .with_input("x", &[2], "int8")
        .with_f32_output(&[1.0; 20]);
    let inputs: NamedInputs = ["x:".to_string() + path.to_str().unwrap()]
        .iter()
        .map(|s| s.parse::<NamedInput>())
        .collect::<Result<_, _>>()?;
    let mut out = Vec::new();

    dispatch(&mut exec, &inputs, &RunConfig::default(), &mut out)?;

    assert_eq!(exec.runs, 1);
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn invalid_input_stops_before_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("x.bin");
    std::fs::write(&path, [0u8; 5])?;

    let mut exec = RecordingExecutor::default()
        .with_input("x", &[4], "uint8")
        .with_f32_output(&[1.0; 10]);
    let inputs: NamedInputs = [NamedInput {
        name: "x".to_string(),
        path,
    }]
    .into_iter()
    .collect();
    let mut out = Vec::new();

    let err = dispatch(&mut exec, &inputs, &debug_config(), &mut out).unwrap_err();

    assert!(err.downcast_ref::<LoadError>().is_some());
    assert_eq!(exec.runs, 0);
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn debug_off_inference_only_fetches_the_output_slot() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("x.bin");
    std::fs::write(&path, [0u8; 4])?;

    let mut exec = RecordingExecutor::default()
        .with_input("x", &[1], "float32")
        .with_f32_output(&[0.0])
        .with_uncopyable_outputs("output 0 has unsupported dtype (code 0, bits 64, lanes 1)");
    let inputs: NamedInputs = [NamedInput {
        name: "x".to_string(),
        path,
    }]
    .into_iter()
    .collect();
    let mut out = Vec::new();

    dispatch(&mut exec, &inputs, &RunConfig::default(), &mut out)?;

    assert_eq!(exec.runs, 1);
    assert_eq!(*exec.output_fetches.borrow(), vec![0]);
    assert!(out.is_empty());

    let err = dispatch(&mut exec, &inputs, &debug_config(), &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("unsupported dtype"));
    Ok(())
}
