// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, ScgenConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "scgen_configuration.toml";

type Setter = fn(&mut ScgenConfig, f64);

/// Numeric overrides: (environment variable, CLI key, setter)
const NUMERIC_OVERRIDES: &[(&str, &str, Setter)] = &[
    ("SCGEN_RESOLUTION_MS", "resolution_ms", |c, v| c.simulation.resolution_ms = v),
    ("SCGEN_MIN_DELAY_MS", "min_delay_ms", |c, v| c.simulation.min_delay_ms = v),
    ("SCGEN_DURATION_MS", "duration_ms", |c, v| c.simulation.duration_ms = v),
    ("SCGEN_AMPLITUDE", "amplitude", |c, v| c.generator.amplitude = v),
    ("SCGEN_DECAY_RATE", "decay_rate", |c, v| c.generator.decay_rate = v),
    ("SCGEN_SHAPE", "shape", |c, v| c.generator.shape = v),
    ("SCGEN_POPULATION_SIZE", "population_size", |c, v| c.generator.population_size = v),
    ("SCGEN_DISTANCE", "distance", |c, v| c.generator.distance = v),
    ("SCGEN_ONSET", "onset", |c, v| c.generator.onset = v),
    ("SCGEN_ORIGIN", "origin", |c, v| c.generator.origin = v),
    ("SCGEN_START", "start", |c, v| c.generator.start = v),
    ("SCGEN_STOP", "stop", |c, v| c.generator.stop = Some(v)),
    ("SCGEN_RECORDING_INTERVAL_MS", "interval_ms", |c, v| c.recording.interval_ms = v),
];

/// Find the scgen configuration file
///
/// Search order:
/// 1. `SCGEN_CONFIG_PATH` environment variable
/// 2. Current working directory: `./scgen_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SCGEN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SCGEN_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SCGEN_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or a CLI
/// override is not a number
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<ScgenConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: ScgenConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SCGEN_RESOLUTION_MS`, `SCGEN_MIN_DELAY_MS`, `SCGEN_DURATION_MS`
/// - `SCGEN_AMPLITUDE`, `SCGEN_DECAY_RATE`, `SCGEN_SHAPE`,
///   `SCGEN_POPULATION_SIZE`, `SCGEN_DISTANCE`, `SCGEN_ONSET`
/// - `SCGEN_ORIGIN`, `SCGEN_START`, `SCGEN_STOP`
/// - `SCGEN_RECORDING_INTERVAL_MS`
/// - `SCGEN_LOG_LEVEL` -> `logging.level`
///
/// Values that do not parse are ignored.
pub fn apply_environment_overrides(config: &mut ScgenConfig) {
    for (var, _, set) in NUMERIC_OVERRIDES {
        if let Ok(value) = env::var(var) {
            if let Ok(number) = value.parse::<f64>() {
                set(config, number);
            }
        }
    }

    if let Ok(value) = env::var("SCGEN_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"onset": "20", "log_level": "debug"}`)
///
/// # Errors
///
/// `InvalidValue` for an unknown key or a value that is not a number. Unlike
/// environment variables, explicit user input is never silently dropped.
pub fn apply_cli_overrides(
    config: &mut ScgenConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for (key, value) in cli_args {
        if key == "log_level" {
            config.logging.level = value.clone();
            continue;
        }

        let (_, _, set) = NUMERIC_OVERRIDES
            .iter()
            .find(|(_, cli_key, _)| cli_key == key)
            .ok_or_else(|| ConfigError::InvalidValue(format!("unknown override key '{}'", key)))?;
        let number = value.parse::<f64>().map_err(|_| {
            ConfigError::InvalidValue(format!("{} = '{}' is not a number", key, value))
        })?;
        set(config, number);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("SCGEN_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SCGEN_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("SCGEN_CONFIG_PATH", "/definitely/not/here/scgen.toml");
        let result = find_config_file();
        env::remove_var("SCGEN_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[simulation]").unwrap();
        writeln!(file, "resolution_ms = 0.5").unwrap();
        writeln!(file, "[generator]").unwrap();
        writeln!(file, "onset = 12.5").unwrap();
        writeln!(file, "stop = 80.0").unwrap();
        writeln!(file, "[population]").unwrap();
        writeln!(file, "distances = [0.0, 0.5]").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.simulation.resolution_ms, 0.5);
        assert_eq!(config.simulation.duration_ms, 100.0);
        assert_eq!(config.generator.onset, 12.5);
        assert_eq!(config.generator.stop, Some(80.0));
        assert_eq!(config.generator.population_size, 1.0);
        assert_eq!(config.target_distances(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[generator\nonset = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = ScgenConfig::default();

        env::set_var("SCGEN_ONSET", "42");
        env::set_var("SCGEN_STOP", "90");
        env::set_var("SCGEN_SHAPE", "not-a-number");
        env::set_var("SCGEN_LOG_LEVEL", "debug");

        apply_environment_overrides(&mut config);

        env::remove_var("SCGEN_ONSET");
        env::remove_var("SCGEN_STOP");
        env::remove_var("SCGEN_SHAPE");
        env::remove_var("SCGEN_LOG_LEVEL");

        assert_eq!(config.generator.onset, 42.0);
        assert_eq!(config.generator.stop, Some(90.0));
        assert_eq!(config.generator.shape, 0.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = ScgenConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("amplitude".to_string(), "250".to_string());
        cli_args.insert("log_level".to_string(), "warn".to_string());

        apply_cli_overrides(&mut config, &cli_args).unwrap();

        assert_eq!(config.generator.amplitude, 250.0);
        assert_eq!(config.logging.level, "warn");

        let mut bad = HashMap::new();
        bad.insert("frequency".to_string(), "10".to_string());
        assert!(apply_cli_overrides(&mut config, &bad).is_err());

        let mut bad = HashMap::new();
        bad.insert("onset".to_string(), "soon".to_string());
        assert!(apply_cli_overrides(&mut config, &bad).is_err());
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[generator]").unwrap();
        writeln!(file, "amplitude = 1.0").unwrap();
        writeln!(file, "onset = 1.0").unwrap();

        env::set_var("SCGEN_AMPLITUDE", "2.0");
        env::set_var("SCGEN_ONSET", "2.0");

        let mut cli_args = HashMap::new();
        cli_args.insert("amplitude".to_string(), "3.0".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("SCGEN_AMPLITUDE");
        env::remove_var("SCGEN_ONSET");

        // CLI wins for amplitude, env wins for onset (no CLI override)
        assert_eq!(config.generator.amplitude, 3.0);
        assert_eq!(config.generator.onset, 2.0);
    }
}
