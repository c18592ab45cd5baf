// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Burst profile of the generator.
//!
//! Pure, deterministic functions; the generator evaluates them once per step.
//!
//! ```text
//! t = max(0, τ − onset)
//! A = amplitude · exp(−distance² / (2·population_size²))
//! B = t^shape · exp(−decay_rate · t)
//! I = A · B
//! ```
//!
//! `t^shape` follows IEEE-754 `pow`: `0^0 = 1` and `0^shape = +inf` for
//! `shape < 0`.

use crate::parameters::GeneratorParameters;

/// Local burst time; clamped so the burst never runs backward
///
/// # Example
/// ```
/// use scgen_device::local_time;
///
/// assert_eq!(local_time(10.0, 5.0), 5.0);
/// assert_eq!(local_time(3.0, 5.0), 0.0);
/// ```
#[inline]
pub fn local_time(time_ms: f64, onset_ms: f64) -> f64 {
    let t = time_ms - onset_ms;
    if t < 0.0 {
        0.0
    } else {
        t
    }
}

/// Amplitude attenuated by the target's distance from the burst origin
#[inline]
pub fn spatial_attenuation(amplitude: f64, distance: f64, population_size: f64) -> f64 {
    amplitude * (-(distance * distance) / (2.0 * (population_size * population_size))).exp()
}

/// Skewed-gamma time course at local time `t`
#[inline]
pub fn temporal_shape(t: f64, shape: f64, decay_rate: f64) -> f64 {
    t.powf(shape) * (-decay_rate * t).exp()
}

/// Current (pA) the generator computes at absolute time `time_ms`
///
/// # Example
/// ```
/// use scgen_device::{burst_current, GeneratorParameters};
///
/// let params = GeneratorParameters {
///     amplitude: 2.0,
///     decay_rate: 0.1,
///     shape: 2.0,
///     population_size: 1.0,
///     distance: 0.0,
///     onset: 5.0,
/// };
/// let current = burst_current(&params, 10.0);
/// assert!((current - 50.0 * (-0.5f64).exp()).abs() < 1e-9);
/// ```
#[inline]
pub fn burst_current(params: &GeneratorParameters, time_ms: f64) -> f64 {
    let t = local_time(time_ms, params.onset);
    spatial_attenuation(params.amplitude, params.distance, params.population_size)
        * temporal_shape(t, params.shape, params.decay_rate)
}

/// Absolute time at which the burst peaks
///
/// `t^γ·e^(−βt)` peaks at `t = γ/β`; there is no interior peak unless both
/// shape and decay rate are positive.
pub fn peak_time(params: &GeneratorParameters) -> Option<f64> {
    if params.shape > 0.0 && params.decay_rate > 0.0 {
        Some(params.onset + params.shape / params.decay_rate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> GeneratorParameters {
        GeneratorParameters {
            amplitude: 2.0,
            decay_rate: 0.1,
            shape: 2.0,
            population_size: 1.0,
            distance: 0.0,
            onset: 5.0,
        }
    }

    #[test]
    fn test_reference_value() {
        let current = burst_current(&reference(), 10.0);
        assert!((current - 30.326532985631665).abs() < 1e-9);
    }

    #[test]
    fn test_pre_onset_clamp() {
        let mut params = reference();
        for time in [0.0, 1.0, 4.9, 5.0] {
            assert_eq!(burst_current(&params, time), 0.0);
        }

        // shape 0: t^0 = 1, only the spatial factor remains
        params.shape = 0.0;
        params.distance = 1.0;
        let expected = 2.0 * (-0.5f64).exp();
        assert!((burst_current(&params, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_negative_shape_at_zero_is_infinite() {
        let params = GeneratorParameters {
            amplitude: 1.0,
            shape: -1.0,
            ..Default::default()
        };
        assert_eq!(burst_current(&params, 0.0), f64::INFINITY);
        assert!((burst_current(&params, 2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_spatial_attenuation_is_symmetric() {
        let near = spatial_attenuation(1.0, 0.5, 1.0);
        assert_eq!(near, spatial_attenuation(1.0, -0.5, 1.0));
        assert!(near < 1.0);
        assert_eq!(spatial_attenuation(1.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_peak_time() {
        let params = reference();
        let peak = peak_time(&params).unwrap();
        assert!((peak - 25.0).abs() < 1e-12);

        let before = burst_current(&params, peak - 1.0);
        let at = burst_current(&params, peak);
        let after = burst_current(&params, peak + 1.0);
        assert!(at > before && at > after);

        assert!(peak_time(&GeneratorParameters::default()).is_none());
    }
}
