// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Current events and the sinks/targets that accept them

use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port index returned by a successful connection test
pub type Port = i64;

/// Receptor type requested on the target side of a connection
pub type Receptor = i64;

/// Synapse model index of a connection
pub type SynIndex = u16;

/// Global node identifier assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instantaneous current (pA) sent to downstream nodes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentEvent {
    current: f64,
}

impl CurrentEvent {
    pub fn new(current: f64) -> Self {
        Self { current }
    }

    pub fn set_current(&mut self, current: f64) {
        self.current = current;
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

/// Event delivery collaborator
///
/// The host routes each event to every connected target at the connection
/// delay. Devices call this once per active step and never batch.
pub trait EventSink {
    fn send_current(&mut self, sender: NodeId, event: CurrentEvent, lag: i64);
}

/// A current event as seen by the sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveredEvent {
    pub sender: NodeId,
    pub current: f64,
    pub lag: i64,
}

/// In-memory sink that keeps every event in arrival order
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: Vec<DeliveredEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DeliveredEvent] {
        &self.events
    }

    /// Take all buffered events, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<DeliveredEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventBuffer {
    fn send_current(&mut self, sender: NodeId, event: CurrentEvent, lag: i64) {
        self.events.push(DeliveredEvent {
            sender,
            current: event.current(),
            lag,
        });
    }
}

/// Connection-test side of a node that may receive current events
///
/// Targets that do not integrate currents keep the default, which rejects
/// every receptor.
pub trait CurrentEventTarget {
    fn model_name(&self) -> &str;

    /// Check that a current event can be delivered on `receptor`
    fn handles_current_event(&self, receptor: Receptor) -> Result<Port> {
        Err(KernelError::UnsupportedReceptor {
            receptor,
            model: self.model_name().to_string(),
        })
    }
}
