// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent, within valid ranges, and don't conflict with each other.

use crate::{ConfigError, ConfigResult, ScgenConfig};

/// Accepted `logging.level` values
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

fn invalid(errors: &mut Vec<ConfigValidationError>, field: &str, reason: impl Into<String>) {
    errors.push(ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    });
}

/// Validate the complete configuration
///
/// Checks for:
/// - A positive, finite step grid with intervals that are multiples of it
/// - Finite generator parameters and a non-zero population size
/// - A window whose stop does not precede its start
/// - Recordables and a known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &ScgenConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// All validation problems, in section order
pub fn collect_errors(config: &ScgenConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_simulation(config, &mut errors);
    validate_generator(config, &mut errors);
    validate_recording(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

/// `value` is a positive whole multiple of `resolution`
fn is_grid_multiple(value: f64, resolution: f64) -> bool {
    if !value.is_finite() || value < resolution * (1.0 - 1e-9) {
        return false;
    }
    let steps = value / resolution;
    (steps - steps.round()).abs() <= 1e-9 * steps.abs().max(1.0)
}

fn validate_simulation(config: &ScgenConfig, errors: &mut Vec<ConfigValidationError>) {
    let sim = &config.simulation;

    if !(sim.resolution_ms.is_finite() && sim.resolution_ms > 0.0) {
        invalid(errors, "simulation.resolution_ms", "must be positive and finite");
        return;
    }

    if !is_grid_multiple(sim.min_delay_ms, sim.resolution_ms) {
        invalid(
            errors,
            "simulation.min_delay_ms",
            format!("must be a multiple of the resolution ({} ms)", sim.resolution_ms),
        );
    }

    if !(sim.duration_ms.is_finite() && sim.duration_ms >= 0.0) {
        invalid(errors, "simulation.duration_ms", "must be non-negative and finite");
    }
}

fn validate_generator(config: &ScgenConfig, errors: &mut Vec<ConfigValidationError>) {
    let gen = &config.generator;

    let values = [
        ("generator.amplitude", gen.amplitude),
        ("generator.decay_rate", gen.decay_rate),
        ("generator.shape", gen.shape),
        ("generator.population_size", gen.population_size),
        ("generator.distance", gen.distance),
        ("generator.onset", gen.onset),
        ("generator.origin", gen.origin),
        ("generator.start", gen.start),
    ];
    for (field, value) in values {
        if !value.is_finite() {
            invalid(errors, field, "must be finite");
        }
    }

    let spread = 2.0 * gen.population_size * gen.population_size;
    if gen.population_size.is_finite() && !spread.is_normal() {
        invalid(
            errors,
            "generator.population_size",
            format!("2·population_size² must be a normal positive number, got {}", spread),
        );
    }

    if let Some(stop) = gen.stop {
        if stop.is_nan() {
            invalid(errors, "generator.stop", "must be a number");
        } else if stop < gen.start {
            invalid(
                errors,
                "generator.stop",
                format!("stop ({}) precedes start ({})", stop, gen.start),
            );
        }
    }

    for (index, distance) in config.population.distances.iter().enumerate() {
        if !distance.is_finite() {
            invalid(errors, &format!("population.distances[{}]", index), "must be finite");
        }
    }
    // A population list replaces the single distance
    if !config.population.distances.is_empty() && gen.distance != 0.0 {
        invalid(
            errors,
            "generator.distance",
            "ignored when population.distances is set; list the distance there",
        );
    }
}

fn validate_recording(config: &ScgenConfig, errors: &mut Vec<ConfigValidationError>) {
    let rec = &config.recording;
    let resolution = config.simulation.resolution_ms;

    if resolution.is_finite() && resolution > 0.0 && !is_grid_multiple(rec.interval_ms, resolution) {
        invalid(
            errors,
            "recording.interval_ms",
            format!("must be a multiple of the resolution ({} ms)", resolution),
        );
    }

    if rec.recordables.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "recording.recordables".to_string(),
        });
    }
}

fn validate_logging(config: &ScgenConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(
            errors,
            "logging.level",
            format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        );
    }
}
