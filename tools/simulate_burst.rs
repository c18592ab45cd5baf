// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Run a population of saccade burst generators and print the recorded trace.
//!
//! Configuration comes from `scgen_configuration.toml` (or `--config`), then
//! `SCGEN_*` environment variables, then `--set key=value` overrides.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use scgen::config::{load_config, validate_config};
use scgen::device::{peak_time, GeneratorParameters};
use scgen::harness::RunPlan;
use scgen::observability::{debug_flags_help, init_logging, parse_debug_flags};
use serde_json::json;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

struct Args {
    config: Option<PathBuf>,
    overrides: HashMap<String, String>,
    format: OutputFormat,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: simulate_burst [--config <path>] [--set key=value]... [--format csv|json] [--debug-<crate>]\n\n\
         Override keys:\n\
         - simulation: resolution_ms, min_delay_ms, duration_ms\n\
         - generator: amplitude, decay_rate, shape, population_size, distance, onset, origin, start, stop\n\
         - recording: interval_ms\n\
         - logging: log_level\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args_out = Args {
        config: None,
        overrides: HashMap::new(),
        format: OutputFormat::Csv,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                args_out.config = Some(PathBuf::from(v));
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let Some((key, value)) = v.split_once('=') else {
                    eprintln!("Expected key=value after --set, got: {v}");
                    usage_and_exit();
                };
                args_out
                    .overrides
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
            "--format" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                args_out.format = match v.as_str() {
                    "csv" => OutputFormat::Csv,
                    "json" => OutputFormat::Json,
                    other => {
                        eprintln!("Unknown format: {other}");
                        usage_and_exit();
                    }
                };
            }
            "-h" | "--help" => usage_and_exit(),
            debug if debug.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    args_out
}

fn main() -> Result<()> {
    let args = parse_args();

    let config = load_config(args.config.as_deref(), Some(&args.overrides))
        .context("Failed to load configuration")?;
    validate_config(&config)?;

    let _logging = init_logging(&parse_debug_flags(), &config.logging)?;

    let gen = &config.generator;
    let params = GeneratorParameters {
        amplitude: gen.amplitude,
        decay_rate: gen.decay_rate,
        shape: gen.shape,
        population_size: gen.population_size,
        distance: gen.distance,
        onset: gen.onset,
    };
    match peak_time(&params) {
        Some(peak) => info!(peak_ms = peak, "burst peaks at onset + shape/decayRate"),
        None => info!("burst has no interior peak (shape or decayRate not positive)"),
    }

    let plan = RunPlan::from_config(&config)?;
    let outcome = plan.run()?;

    for trace in &outcome.traces {
        for (distance, peak) in trace.distances.iter().zip(trace.peaks()) {
            if let Some((time_ms, value)) = peak {
                info!(recordable = %trace.recordable, distance, time_ms, value, "recorded peak");
            }
        }
    }

    match args.format {
        OutputFormat::Csv => {
            let blocks: Vec<String> = outcome.traces.iter().map(|t| t.to_csv()).collect();
            print!("{}", blocks.join("\n"));
        }
        OutputFormat::Json => {
            let traces: Vec<_> = outcome.traces.iter().map(|t| t.to_json()).collect();
            let document = json!({
                "delivered_events": outcome.delivered_events,
                "traces": traces,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
