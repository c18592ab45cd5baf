// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # scgen Kernel Seams
//!
//! Everything a stimulation device needs from its host simulator, expressed as
//! traits plus small reference implementations:
//! - **Time**: simulation clock (resolution) and update step ranges
//! - **Events**: current events, event sinks and connection targets
//! - **Stimulating device**: the activation window (origin/start/stop)
//! - **Recording**: recordable registries and the universal data logger
//! - **Node**: the capability trait devices implement instead of inheriting a
//!   framework base class
//!
//! The reference collaborators (`EventBuffer`, `DataLogger`, `StimulatingDevice`)
//! are deliberately minimal. Routing, delays and multi-threaded stepping belong
//! to the host.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod event;
pub mod node;
pub mod recording;
pub mod stimulating_device;
pub mod time;

pub use error::{KernelError, Result};
pub use event::{
    CurrentEvent, CurrentEventTarget, DeliveredEvent, EventBuffer, EventSink, NodeId, Port,
    Receptor, SynIndex,
};
pub use node::Node;
pub use recording::{
    DataLogger, DataLoggingReply, DataLoggingRequest, RecordablesMap, Sample,
};
pub use stimulating_device::{StimulatingDevice, WindowStatus, WindowUpdate};
pub use time::{SimulationClock, StepRange};
