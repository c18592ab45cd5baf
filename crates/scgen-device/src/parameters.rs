// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Generator parameters and their recognized keys.
//!
//! | field | key | legacy key | unit |
//! |---|---|---|---|
//! | amplitude | `amplitude` | `i0` | pA |
//! | decay_rate | `decayRate` | `beta` | 1/ms |
//! | shape | `shape` | `gamma` | – |
//! | population_size | `populationSize` | `pop` | mm |
//! | distance | `distance` | `distance` | mm |
//! | onset | `onset` | `sc_onset` | ms |

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Burst generator parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorParameters {
    /// Scaling constant (pA)
    pub amplitude: f64,

    /// Burst-duration decay coefficient (1/ms)
    pub decay_rate: f64,

    /// Skewness and peak exponent of the burst
    pub shape: f64,

    /// Spatial spread of the recruited population (mm); never zero
    pub population_size: f64,

    /// Offset between the target and the burst origin (mm)
    pub distance: f64,

    /// Time at which the burst's local clock starts (ms)
    pub onset: f64,
}

impl GeneratorParameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::Amplitude => self.amplitude,
            ParameterKey::DecayRate => self.decay_rate,
            ParameterKey::Shape => self.shape,
            ParameterKey::PopulationSize => self.population_size,
            ParameterKey::Distance => self.distance,
            ParameterKey::Onset => self.onset,
        }
    }

    pub fn set(&mut self, key: ParameterKey, value: f64) {
        match key {
            ParameterKey::Amplitude => self.amplitude = value,
            ParameterKey::DecayRate => self.decay_rate = value,
            ParameterKey::Shape => self.shape = value,
            ParameterKey::PopulationSize => self.population_size = value,
            ParameterKey::Distance => self.distance = value,
            ParameterKey::Onset => self.onset = value,
        }
    }

    /// Overwrite every field present in `update`
    pub fn apply(&mut self, update: &ParameterUpdate) {
        for key in ParameterKey::ALL {
            if let Some(value) = update.get(key) {
                self.set(key, value);
            }
        }
    }

    /// Check the constraints that make the burst profile well defined
    ///
    /// Every value must be finite, and `2·population_size²` (the divisor of
    /// the spatial exponent) must neither underflow to zero or a subnormal
    /// nor overflow.
    pub fn validate(&self) -> Result<()> {
        for key in ParameterKey::ALL {
            let value = self.get(key);
            if !value.is_finite() {
                return Err(GeneratorError::invalid(
                    key.name(),
                    format!("must be finite, got {}", value),
                ));
            }
        }
        let spread = 2.0 * self.population_size * self.population_size;
        if !spread.is_normal() {
            return Err(GeneratorError::invalid(
                ParameterKey::PopulationSize.name(),
                format!(
                    "2·populationSize² must be a normal positive number, got {} for {}",
                    spread, self.population_size
                ),
            ));
        }
        Ok(())
    }
}

impl Default for GeneratorParameters {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            decay_rate: 0.0,
            shape: 0.0,
            population_size: 1.0,
            distance: 0.0,
            onset: 0.0,
        }
    }
}

/// Recognized parameter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    Amplitude,
    DecayRate,
    Shape,
    PopulationSize,
    Distance,
    Onset,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 6] = [
        ParameterKey::Amplitude,
        ParameterKey::DecayRate,
        ParameterKey::Shape,
        ParameterKey::PopulationSize,
        ParameterKey::Distance,
        ParameterKey::Onset,
    ];

    /// Canonical key
    pub fn name(self) -> &'static str {
        match self {
            ParameterKey::Amplitude => "amplitude",
            ParameterKey::DecayRate => "decayRate",
            ParameterKey::Shape => "shape",
            ParameterKey::PopulationSize => "populationSize",
            ParameterKey::Distance => "distance",
            ParameterKey::Onset => "onset",
        }
    }

    /// Key used by existing model descriptions
    pub fn legacy_name(self) -> &'static str {
        match self {
            ParameterKey::Amplitude => "i0",
            ParameterKey::DecayRate => "beta",
            ParameterKey::Shape => "gamma",
            ParameterKey::PopulationSize => "pop",
            ParameterKey::Distance => "distance",
            ParameterKey::Onset => "sc_onset",
        }
    }

    /// Look up a canonical or legacy key
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == name || key.legacy_name() == name)
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterKey {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| GeneratorError::invalid(s, "unknown parameter key"))
    }
}

/// Partial parameter update; `None` keeps the live value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterUpdate {
    pub amplitude: Option<f64>,
    pub decay_rate: Option<f64>,
    pub shape: Option<f64>,
    pub population_size: Option<f64>,
    pub distance: Option<f64>,
    pub onset: Option<f64>,
}

impl ParameterUpdate {
    pub fn get(&self, key: ParameterKey) -> Option<f64> {
        match key {
            ParameterKey::Amplitude => self.amplitude,
            ParameterKey::DecayRate => self.decay_rate,
            ParameterKey::Shape => self.shape,
            ParameterKey::PopulationSize => self.population_size,
            ParameterKey::Distance => self.distance,
            ParameterKey::Onset => self.onset,
        }
    }

    pub fn set(&mut self, key: ParameterKey, value: f64) {
        let slot = match key {
            ParameterKey::Amplitude => &mut self.amplitude,
            ParameterKey::DecayRate => &mut self.decay_rate,
            ParameterKey::Shape => &mut self.shape,
            ParameterKey::PopulationSize => &mut self.population_size,
            ParameterKey::Distance => &mut self.distance,
            ParameterKey::Onset => &mut self.onset,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        ParameterKey::ALL.into_iter().all(|key| self.get(key).is_none())
    }
}

impl From<GeneratorParameters> for ParameterUpdate {
    fn from(params: GeneratorParameters) -> Self {
        let mut update = ParameterUpdate::default();
        for key in ParameterKey::ALL {
            update.set(key, params.get(key));
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = GeneratorParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.population_size, 1.0);
        assert_eq!(params.amplitude, 0.0);
    }

    #[test]
    fn test_zero_population_rejected() {
        let params = GeneratorParameters {
            population_size: 0.0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InvalidParameter { ref key, .. } if key == "populationSize"
        ));
    }

    #[test]
    fn test_population_spread_must_stay_normal() {
        let with_pop = |population_size| GeneratorParameters {
            population_size,
            ..Default::default()
        };
        // 2·pop² underflows although pop itself is nonzero
        assert!(with_pop(1e-200).validate().is_err());
        assert!(with_pop(-1e-200).validate().is_err());
        assert!(with_pop(f64::MIN_POSITIVE).validate().is_err());
        // 2·pop² overflows to +inf
        assert!(with_pop(1e200).validate().is_err());

        assert!(with_pop(1e-100).validate().is_ok());
        assert!(with_pop(-2.0).validate().is_ok());
        assert!(with_pop(1e100).validate().is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        for key in ParameterKey::ALL {
            let mut params = GeneratorParameters::default();
            params.set(key, f64::NAN);
            assert!(params.validate().is_err(), "{} accepted NaN", key);
            params.set(key, f64::INFINITY);
            assert!(params.validate().is_err(), "{} accepted inf", key);
        }
    }

    #[test]
    fn test_key_names_and_aliases() {
        assert_eq!(ParameterKey::from_name("decayRate"), Some(ParameterKey::DecayRate));
        assert_eq!(ParameterKey::from_name("beta"), Some(ParameterKey::DecayRate));
        assert_eq!(ParameterKey::from_name("sc_onset"), Some(ParameterKey::Onset));
        assert_eq!(ParameterKey::from_name("pop"), Some(ParameterKey::PopulationSize));
        assert_eq!(ParameterKey::from_name("frequency"), None);
        assert!("amplitude".parse::<ParameterKey>().is_ok());
        assert!("phase".parse::<ParameterKey>().is_err());
    }

    #[test]
    fn test_partial_apply_keeps_other_fields() {
        let mut params = GeneratorParameters {
            amplitude: 3.0,
            shape: 2.0,
            ..Default::default()
        };
        let update = ParameterUpdate {
            shape: Some(4.0),
            ..Default::default()
        };
        params.apply(&update);
        assert_eq!(params.amplitude, 3.0);
        assert_eq!(params.shape, 4.0);
    }

    #[test]
    fn test_serde_uses_camel_case_keys() {
        let params = GeneratorParameters {
            decay_rate: 0.25,
            population_size: 2.0,
            ..Default::default()
        };
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["decayRate"], 0.25);
        assert_eq!(json["populationSize"], 2.0);
    }
}
