// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Saccade Burst Current Generator
//!
//! A stimulation device that injects the current of a saccade-related
//! population burst into its targets:
//!
//! ```text
//! I(t) = i0 · exp(−distance² / (2·pop²)) · t^gamma · exp(−beta·t)
//! t    = max(0, simulation_time − onset)
//! ```
//!
//! - **profile**: the closed-form burst profile (pure functions)
//! - **parameters**: the typed parameter set and its key mapping
//! - **status**: status snapshots and partial key/value updates
//! - **generator**: the device itself, implementing `scgen_kernel::Node`
//!
//! Setting start/stop on the device only windows the current; it does not
//! shift the time axis of the burst.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod generator;
pub mod parameters;
pub mod profile;
pub mod status;

pub use error::{GeneratorError, Result};
pub use generator::{recordables, GeneratorState, Lifecycle, SaccadeCurrentGenerator, MODEL_NAME};
pub use parameters::{GeneratorParameters, ParameterKey, ParameterUpdate};
pub use profile::{burst_current, local_time, peak_time, spatial_attenuation, temporal_shape};
pub use status::{GeneratorStatus, StatusKey, StatusUpdate};
