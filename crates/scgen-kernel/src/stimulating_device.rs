// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Stimulating Device (Activation Window)
//!
//! Generic start/stop gating shared by all stimulation devices.
//!
//! ```text
//! t_min = steps(origin) + steps(start)
//! t_max = steps(origin) + steps(stop)      (unbounded when stop = +inf)
//!
//! active at step s  ⇔  t_min <= s + 1 < t_max
//! ```
//!
//! A current computed at step `s` acts on the target from `s + 1`, hence the
//! shift by one. Setting start/stop only windows a device's output; it never
//! shifts the device's own time axis.

use crate::error::{KernelError, Result};
use crate::event::SynIndex;
use crate::time::SimulationClock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Window configuration as reported by `get_status`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStatus {
    /// Reference time all other values are relative to (ms)
    pub origin: f64,
    /// Activation time relative to origin (ms)
    pub start: f64,
    /// Deactivation time relative to origin (ms), `+inf` for never
    pub stop: f64,
}

impl Default for WindowStatus {
    fn default() -> Self {
        Self {
            origin: 0.0,
            start: 0.0,
            stop: f64::INFINITY,
        }
    }
}

/// Partial window update; `None` keeps the current value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowUpdate {
    pub origin: Option<f64>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
}

impl WindowUpdate {
    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.start.is_none() && self.stop.is_none()
    }
}

/// Activation-window collaborator of a stimulation device
#[derive(Debug, Clone, PartialEq)]
pub struct StimulatingDevice {
    clock: SimulationClock,
    window: WindowStatus,
    t_min: i64,
    /// `None` = never stops
    t_max: Option<i64>,
    first_syn_id: Option<SynIndex>,
}

impl StimulatingDevice {
    pub fn new(clock: SimulationClock) -> Self {
        Self {
            clock,
            window: WindowStatus::default(),
            t_min: 0,
            t_max: None,
            first_syn_id: None,
        }
    }

    pub fn get_status(&self) -> WindowStatus {
        self.window
    }

    /// Apply a window update transactionally
    ///
    /// # Errors
    /// `InvalidParameter` if a value is not finite (except `stop = +inf`), lies
    /// off the step grid, or `stop < start`, or if a bound does not fit in an
    /// `i64` step count. The live window is unchanged then.
    pub fn set_status(&mut self, update: &WindowUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let mut candidate = self.window;
        if let Some(origin) = update.origin {
            candidate.origin = origin;
        }
        if let Some(start) = update.start {
            candidate.start = start;
        }
        if let Some(stop) = update.stop {
            candidate.stop = stop;
        }

        let (t_min, t_max) = self.derive_bounds(&candidate)?;

        self.window = candidate;
        self.t_min = t_min;
        self.t_max = t_max;
        debug!(
            origin = candidate.origin,
            start = candidate.start,
            stop = candidate.stop,
            "activation window updated"
        );
        Ok(())
    }

    /// Re-derive the step bounds before a run
    pub fn calibrate(&mut self) -> Result<()> {
        let (t_min, t_max) = self.derive_bounds(&self.window)?;
        self.t_min = t_min;
        self.t_max = t_max;
        Ok(())
    }

    /// Whether output produced at `step` is delivered
    #[inline]
    pub fn is_active(&self, step: i64) -> bool {
        let next = step + 1;
        self.t_min <= next && self.t_max.map_or(true, |t_max| next < t_max)
    }

    /// All outgoing connections of a device must share one synapse model
    pub fn enforce_single_syn_type(&mut self, syn_id: SynIndex) -> Result<()> {
        match self.first_syn_id {
            None => {
                self.first_syn_id = Some(syn_id);
                Ok(())
            }
            Some(first) if first == syn_id => Ok(()),
            Some(first) => Err(KernelError::IllegalConnection(format!(
                "all outgoing connections from a device must use the same synapse type \
                 (first used {}, requested {})",
                first, syn_id
            ))),
        }
    }

    fn derive_bounds(&self, window: &WindowStatus) -> Result<(i64, Option<i64>)> {
        let origin = self.grid_steps("origin", window.origin)?;
        let start = self.grid_steps("start", window.start)?;

        if window.stop.is_nan() || window.stop == f64::NEG_INFINITY {
            return Err(KernelError::InvalidParameter(format!(
                "stop must be a finite time or +inf, got {}",
                window.stop
            )));
        }
        if window.stop < window.start {
            return Err(KernelError::InvalidParameter(format!(
                "stop >= start required (start = {}, stop = {})",
                window.start, window.stop
            )));
        }

        let t_min = Self::offset("start", origin, start)?;
        let t_max = if window.stop == f64::INFINITY {
            None
        } else {
            Some(Self::offset("stop", origin, self.grid_steps("stop", window.stop)?)?)
        };
        Ok((t_min, t_max))
    }

    fn offset(name: &str, origin: i64, steps: i64) -> Result<i64> {
        origin.checked_add(steps).ok_or_else(|| {
            KernelError::InvalidParameter(format!(
                "origin + {} exceeds the representable step range",
                name
            ))
        })
    }

    fn grid_steps(&self, name: &str, ms: f64) -> Result<i64> {
        if !ms.is_finite() {
            return Err(KernelError::InvalidParameter(format!(
                "{} must be finite, got {}",
                name, ms
            )));
        }
        self.clock.ms_to_steps(ms).map_err(|err| match err {
            KernelError::InvalidParameter(reason) => {
                KernelError::InvalidParameter(format!("{}: {}", name, reason))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> StimulatingDevice {
        StimulatingDevice::new(SimulationClock::new(1.0, 10).unwrap())
    }

    #[test]
    fn test_default_window_is_always_active() {
        let d = device();
        assert!(d.is_active(0));
        assert!(d.is_active(1_000_000));
        assert_eq!(d.get_status(), WindowStatus::default());
    }

    #[test]
    fn test_window_bounds_are_shifted_by_one_step() {
        let mut d = device();
        d.set_status(&WindowUpdate {
            origin: Some(10.0),
            start: Some(5.0),
            stop: Some(8.0),
        })
        .unwrap();

        // t_min = 15, t_max = 18: active for steps 14..=16
        assert!(!d.is_active(13));
        assert!(d.is_active(14));
        assert!(d.is_active(16));
        assert!(!d.is_active(17));
    }

    #[test]
    fn test_stop_before_start_is_rejected_atomically() {
        let mut d = device();
        d.set_status(&WindowUpdate {
            start: Some(2.0),
            ..Default::default()
        })
        .unwrap();

        let err = d
            .set_status(&WindowUpdate {
                origin: Some(50.0),
                stop: Some(1.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, KernelError::InvalidParameter(_)));

        // Neither origin nor stop was committed
        let status = d.get_status();
        assert_eq!(status.origin, 0.0);
        assert_eq!(status.start, 2.0);
        assert_eq!(status.stop, f64::INFINITY);
    }

    #[test]
    fn test_off_grid_and_non_finite_values_rejected() {
        let mut d = StimulatingDevice::new(SimulationClock::new(0.1, 10).unwrap());
        assert!(d
            .set_status(&WindowUpdate {
                start: Some(0.05),
                ..Default::default()
            })
            .is_err());
        assert!(d
            .set_status(&WindowUpdate {
                origin: Some(f64::INFINITY),
                ..Default::default()
            })
            .is_err());
        assert!(d
            .set_status(&WindowUpdate {
                stop: Some(f64::NAN),
                ..Default::default()
            })
            .is_err());
        assert!(d
            .set_status(&WindowUpdate {
                start: Some(0.3),
                stop: Some(1.2),
                ..Default::default()
            })
            .is_ok());
    }

    #[test]
    fn test_window_beyond_step_range_is_rejected() {
        let mut d = device();
        let before = d.get_status();

        // Each value alone exceeds i64 steps
        let err = d
            .set_status(&WindowUpdate {
                origin: Some(1e19),
                stop: Some(1e19),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, KernelError::InvalidParameter(_)));

        // Each value converts, but origin + start and origin + stop overflow
        let err = d
            .set_status(&WindowUpdate {
                origin: Some(9e18),
                start: Some(9e18),
                stop: Some(9e18),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, KernelError::InvalidParameter(_)));

        assert_eq!(d.get_status(), before);
        d.calibrate().unwrap();
        assert!(d.is_active(0));
        assert!(d.is_active(1_000_000));
    }

    #[test]
    fn test_single_syn_type() {
        let mut d = device();
        assert!(d.enforce_single_syn_type(3).is_ok());
        assert!(d.enforce_single_syn_type(3).is_ok());
        assert!(matches!(
            d.enforce_single_syn_type(4),
            Err(KernelError::IllegalConnection(_))
        ));
    }
}
