// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recordable registries and the universal data logger.
//!
//! A model publishes its recordable fields once as a `RecordablesMap` over its
//! state type. Logging devices (multimeters) connect with a
//! `DataLoggingRequest`; the node then calls `DataLogger::record_data` once per
//! step and the logger decides whether that step is sampled.

use crate::error::{KernelError, Result};
use crate::event::Port;
use crate::time::SimulationClock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Read accessor for one recordable field
pub type Accessor<S> = fn(&S) -> f64;

/// Named accessors into a model's state
///
/// Built once per model type and read-only afterwards.
pub struct RecordablesMap<S> {
    entries: Vec<(&'static str, Accessor<S>)>,
}

impl<S> RecordablesMap<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an accessor; a second insert under the same name replaces it
    pub fn insert(&mut self, name: &'static str, accessor: Accessor<S>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = accessor,
            None => self.entries.push((name, accessor)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Accessor<S>> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, accessor)| *accessor)
    }

    /// Names of all recordables, in registration order
    pub fn get_list(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for RecordablesMap<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection request from a logging device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLoggingRequest {
    recordables: Vec<String>,
    interval_steps: i64,
}

impl DataLoggingRequest {
    /// # Errors
    /// `InvalidParameter` if `interval_steps < 1`
    pub fn new(recordables: Vec<String>, interval_steps: i64) -> Result<Self> {
        if interval_steps < 1 {
            return Err(KernelError::InvalidParameter(format!(
                "recording interval must be at least one step, got {}",
                interval_steps
            )));
        }
        Ok(Self {
            recordables,
            interval_steps,
        })
    }

    pub fn recordables(&self) -> &[String] {
        &self.recordables
    }

    pub fn interval_steps(&self) -> i64 {
        self.interval_steps
    }
}

/// One sampled row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time the sampled state is valid for (end of the step), ms
    pub time_ms: f64,
    /// One value per requested recordable, in request order
    pub values: Vec<f64>,
}

/// Data handed back to a logging device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLoggingReply {
    pub port: Port,
    pub recordables: Vec<String>,
    pub samples: Vec<Sample>,
}

struct LoggerSlot<S> {
    names: Vec<String>,
    accessors: Vec<Accessor<S>>,
    interval_steps: i64,
    samples: Vec<Sample>,
}

/// Per-node logger serving any number of logging devices
pub struct DataLogger<S> {
    model: &'static str,
    clock: SimulationClock,
    slots: Vec<LoggerSlot<S>>,
}

impl<S> DataLogger<S> {
    pub fn new(model: &'static str, clock: SimulationClock) -> Self {
        Self {
            model,
            clock,
            slots: Vec::new(),
        }
    }

    /// Connect a logging device; returns its 1-based port
    ///
    /// # Errors
    /// `UnknownRecordable` if any requested name is not in `recordables`
    pub fn connect_logging_device(
        &mut self,
        request: &DataLoggingRequest,
        recordables: &RecordablesMap<S>,
    ) -> Result<Port> {
        let accessors = request
            .recordables()
            .iter()
            .map(|name| {
                recordables
                    .get(name)
                    .ok_or_else(|| KernelError::UnknownRecordable {
                        name: name.clone(),
                        model: self.model.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.slots.push(LoggerSlot {
            names: request.recordables().to_vec(),
            accessors,
            interval_steps: request.interval_steps(),
            samples: Vec::new(),
        });
        let port = self.slots.len() as Port;
        debug!(model = self.model, port, "logging device connected");
        Ok(port)
    }

    /// Prepare sample buffers for a run (one min-delay slice worth of rows)
    pub fn init(&mut self) {
        let min_delay = self.clock.min_delay_steps();
        for slot in &mut self.slots {
            slot.samples
                .reserve((min_delay / slot.interval_steps + 1) as usize);
        }
    }

    /// Drop every collected sample; connections stay
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.samples.clear();
        }
    }

    /// Offer the state at the end of `step` to every connected device
    pub fn record_data(&mut self, step: i64, state: &S) {
        let next = step + 1;
        for slot in &mut self.slots {
            if next % slot.interval_steps != 0 {
                continue;
            }
            let values = slot.accessors.iter().map(|read| read(state)).collect();
            slot.samples.push(Sample {
                time_ms: self.clock.step_to_ms(next),
                values,
            });
        }
    }

    /// Hand collected samples to the device on `port` and clear them
    pub fn handle(&mut self, port: Port) -> Result<DataLoggingReply> {
        let slot = usize::try_from(port - 1)
            .ok()
            .and_then(|idx| self.slots.get_mut(idx))
            .ok_or(KernelError::UnknownLoggingPort(port))?;

        Ok(DataLoggingReply {
            port,
            recordables: slot.names.clone(),
            samples: std::mem::take(&mut slot.samples),
        })
    }

    pub fn connected_devices(&self) -> usize {
        self.slots.len()
    }
}
