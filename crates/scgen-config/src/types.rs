// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `scgen_configuration.toml`:
//!
//! ```toml
//! [simulation]
//! resolution_ms = 0.1
//! min_delay_ms = 1.0
//! duration_ms = 200.0
//!
//! [generator]
//! amplitude = 300.0
//! decay_rate = 0.08
//! shape = 2.5
//! population_size = 0.6
//! onset = 20.0
//! start = 0.0
//! # stop = 150.0        (omit for an unbounded window)
//!
//! [population]
//! distances = [0.0, 0.25, 0.5, 1.0]
//!
//! [recording]
//! interval_ms = 1.0
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScgenConfig {
    pub simulation: SimulationConfig,
    pub generator: GeneratorConfig,
    pub population: PopulationConfig,
    pub recording: RecordingConfig,
    pub logging: LoggingConfig,
}

/// Step grid and run length
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Step length (ms)
    pub resolution_ms: f64,
    /// Longest update slice handed to devices (ms); multiple of the resolution
    pub min_delay_ms: f64,
    /// Simulated time (ms)
    pub duration_ms: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            resolution_ms: 0.1,
            min_delay_ms: 1.0,
            duration_ms: 100.0,
        }
    }
}

/// Burst parameters and activation window shared by every target
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub amplitude: f64,
    pub decay_rate: f64,
    pub shape: f64,
    pub population_size: f64,
    /// Used when `population.distances` is empty; a nonzero value next to
    /// that list fails validation
    pub distance: f64,
    pub onset: f64,
    pub origin: f64,
    pub start: f64,
    /// `None` = never stops
    pub stop: Option<f64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            decay_rate: 0.0,
            shape: 0.0,
            population_size: 1.0,
            distance: 0.0,
            onset: 0.0,
            origin: 0.0,
            start: 0.0,
            stop: None,
        }
    }
}

/// Target positions relative to the burst origin
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// One generator per distance (mm)
    pub distances: Vec<f64>,
}

/// Logging-device (multimeter) settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Sampling interval (ms); multiple of the resolution
    pub interval_ms: f64,
    pub recordables: Vec<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1.0,
            recordables: vec!["I".to_string()],
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub format: LogFormat,
    /// Also write rotated log files under `log_dir`
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl ScgenConfig {
    /// Distances of all targets, falling back to the single `generator.distance`
    pub fn target_distances(&self) -> Vec<f64> {
        if self.population.distances.is_empty() {
            vec![self.generator.distance]
        } else {
            self.population.distances.clone()
        }
    }
}
