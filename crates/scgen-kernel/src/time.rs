// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulation time: the step grid and update slices.
//!
//! ```text
//! absolute step  = origin + lag
//! time (ms)      = step × resolution
//! update slice   = lags in [from, to),  0 <= from < to <= min_delay
//! ```

use crate::error::{KernelError, Result};
use std::ops::Range;

/// Relative tolerance used when checking that a time lies on the step grid
const GRID_TOLERANCE: f64 = 1e-9;

/// Step grid of a simulation run
///
/// The resolution is fixed once nodes exist; devices keep a copy of the clock
/// they were created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    resolution_ms: f64,
    min_delay_steps: i64,
}

impl SimulationClock {
    /// Create a clock with the given resolution (ms per step) and min delay (steps)
    pub fn new(resolution_ms: f64, min_delay_steps: i64) -> Result<Self> {
        if !resolution_ms.is_finite() || resolution_ms <= 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "resolution must be a positive finite number of ms, got {}",
                resolution_ms
            )));
        }
        if min_delay_steps < 1 {
            return Err(KernelError::InvalidParameter(format!(
                "min_delay must be at least one step, got {}",
                min_delay_steps
            )));
        }
        Ok(Self {
            resolution_ms,
            min_delay_steps,
        })
    }

    pub fn resolution_ms(&self) -> f64 {
        self.resolution_ms
    }

    pub fn min_delay_steps(&self) -> i64 {
        self.min_delay_steps
    }

    /// Absolute time of a step in ms
    #[inline]
    pub fn step_to_ms(&self, step: i64) -> f64 {
        step as f64 * self.resolution_ms
    }

    /// Whether `ms` is a whole number of steps (within tolerance)
    pub fn is_on_grid(&self, ms: f64) -> bool {
        if !ms.is_finite() {
            return false;
        }
        let steps = (ms / self.resolution_ms).round();
        (steps * self.resolution_ms - ms).abs() <= GRID_TOLERANCE * ms.abs().max(1.0)
    }

    /// Convert a grid-aligned time to steps
    ///
    /// # Errors
    /// `InvalidParameter` if `ms` is not finite, not a multiple of the resolution,
    /// or too large for an `i64` step count
    pub fn ms_to_steps(&self, ms: f64) -> Result<i64> {
        if !self.is_on_grid(ms) {
            return Err(KernelError::InvalidParameter(format!(
                "{} ms is not a multiple of the resolution {} ms",
                ms, self.resolution_ms
            )));
        }
        let steps = (ms / self.resolution_ms).round();
        // `as i64` saturates; 2^63 itself is already out of range
        if !(steps >= i64::MIN as f64 && steps < i64::MAX as f64) {
            return Err(KernelError::InvalidParameter(format!(
                "{} ms is {} steps, outside the representable step range",
                ms, steps
            )));
        }
        Ok(steps as i64)
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            resolution_ms: 0.1,
            min_delay_steps: 10,
        }
    }
}

/// One update slice handed to a node by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    origin: i64,
    from: i64,
    to: i64,
}

impl StepRange {
    /// Validate and build an update slice
    ///
    /// # Errors
    /// `InvalidStepRange` unless `0 <= from < to <= min_delay`
    pub fn new(origin: i64, from: i64, to: i64, clock: &SimulationClock) -> Result<Self> {
        if from < 0 || from >= to || to > clock.min_delay_steps() {
            return Err(KernelError::InvalidStepRange {
                from,
                to,
                min_delay: clock.min_delay_steps(),
            });
        }
        Ok(Self { origin, from, to })
    }

    pub fn origin(&self) -> i64 {
        self.origin
    }

    /// Lags processed by this slice
    pub fn lags(&self) -> Range<i64> {
        self.from..self.to
    }

    /// Absolute step of a lag
    #[inline]
    pub fn step(&self, lag: i64) -> i64 {
        self.origin + lag
    }

    pub fn len(&self) -> usize {
        (self.to - self.from) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
