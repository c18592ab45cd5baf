// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # scgen - Saccade Burst Current Generator
//!
//! A stimulation device for discrete-time neural simulators. Each step it
//! injects the current of a superior-colliculus saccade burst, as seen by a
//! target at some distance from the burst centre:
//!
//! ```text
//! I(t) = i0 · exp(−distance² / (2·pop²)) · t^gamma · exp(−beta·t)
//! t    = max(0, simulation_time − onset)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use scgen::prelude::*;
//!
//! let clock = SimulationClock::new(1.0, 10)?;
//! let mut generator = SaccadeCurrentGenerator::with_parameters(
//!     clock,
//!     GeneratorParameters {
//!         amplitude: 2.0,
//!         decay_rate: 0.1,
//!         shape: 2.0,
//!         population_size: 1.0,
//!         distance: 0.0,
//!         onset: 5.0,
//!     },
//! )?;
//!
//! generator.init_buffers();
//! generator.calibrate()?;
//!
//! let mut sink = EventBuffer::new();
//! generator.update(StepRange::new(0, 0, 10, &clock)?, &mut sink)?;
//! assert_eq!(sink.len(), 10);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! scgen (this crate: re-exports + run harness)
//! ├── scgen-kernel          (Node trait, clock, events, activation window, data logger)
//! ├── scgen-device          (the generator: parameters, profile, status, lifecycle)
//! ├── scgen-config          (TOML configuration with env/CLI overrides)
//! └── scgen-observability   (tracing setup, per-crate debug flags)
//! ```
//!
//! ## Running from configuration
//!
//! ```rust,no_run
//! use scgen::harness::RunPlan;
//!
//! let config = scgen::config::load_config(None, None)?;
//! let outcome = RunPlan::from_config(&config)?.run()?;
//! print!("{}", outcome.traces[0].to_csv());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//! - **`file-logging`**: rotated log files for the `simulate_burst` tool
//!
//! ## License
//!
//! Licensed under Apache License 2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use scgen_config as config;
pub use scgen_device as device;
pub use scgen_kernel as kernel;
pub use scgen_observability as observability;

pub mod harness;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::harness::{PopulationTrace, RunOutcome, RunPlan};
    pub use scgen_device::{
        burst_current, GeneratorError, GeneratorParameters, GeneratorStatus, Lifecycle,
        ParameterKey, SaccadeCurrentGenerator, StatusUpdate,
    };
    pub use scgen_kernel::{
        CurrentEvent, CurrentEventTarget, DataLoggingRequest, EventBuffer, EventSink, KernelError,
        Node, NodeId, SimulationClock, StepRange,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let generator = SaccadeCurrentGenerator::new(SimulationClock::default());
        assert_eq!(generator.model_name(), scgen_device::MODEL_NAME);
        assert_eq!(generator.lifecycle(), Lifecycle::Constructed);
    }
}
