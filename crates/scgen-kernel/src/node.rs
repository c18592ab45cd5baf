// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Node Capability Trait
//!
//! The contract between the host kernel and any model it schedules. Models
//! implement this trait instead of extending a framework base class.
//!
//! ## Lifecycle
//!
//! ```text
//! construct ─► set_status* ─► init_buffers ─► calibrate ─► update(slice)*
//!                  ▲                                            │
//!                  └──────────── between runs ◄─────────────────┘
//! ```

use crate::error::KernelError;
use crate::event::{CurrentEventTarget, EventSink, NodeId, Port, Receptor, SynIndex};
use crate::recording::{DataLoggingReply, DataLoggingRequest};
use crate::time::StepRange;

pub trait Node {
    /// Snapshot returned by `get_status`
    type Status;

    /// Partial update accepted by `set_status`
    type StatusUpdate;

    /// Model error; must be able to carry kernel errors
    type Error: From<KernelError>;

    // === Identity ===

    fn model_name(&self) -> &'static str;

    fn node_id(&self) -> NodeId;

    fn set_node_id(&mut self, id: NodeId);

    /// Whether remote processes need a proxy of this node
    fn has_proxies(&self) -> bool {
        true
    }

    /// Whether logging devices may connect to local instances directly
    fn local_receiver(&self) -> bool {
        false
    }

    // === Lifecycle hooks ===

    /// Copy dynamic state from a prototype instance
    fn init_state(&mut self, proto: &Self)
    where
        Self: Sized;

    /// Reset buffers and dynamic state before a run
    fn init_buffers(&mut self);

    /// Derive per-run values; called before every run
    fn calibrate(&mut self) -> Result<(), Self::Error>;

    /// Advance through every lag of `range`
    fn update(&mut self, range: StepRange, sink: &mut dyn EventSink) -> Result<(), Self::Error>;

    // === Event-handling hooks ===

    /// Connection test for an outgoing connection to `target`
    fn send_test_event(
        &mut self,
        _target: &dyn CurrentEventTarget,
        _receptor: Receptor,
        _syn_id: SynIndex,
    ) -> Result<Port, Self::Error> {
        Err(KernelError::IllegalConnection(format!(
            "{} does not send events",
            self.model_name()
        ))
        .into())
    }

    /// Connection test for an incoming logging device
    fn handles_logging_request(
        &mut self,
        request: &DataLoggingRequest,
        receptor: Receptor,
    ) -> Result<Port, Self::Error>;

    /// Serve the data collected for a connected logging device
    fn handle_logging_request(&mut self, port: Port) -> Result<DataLoggingReply, Self::Error>;

    // === Status accessors ===

    fn get_status(&self) -> Self::Status;

    fn set_status(&mut self, update: &Self::StatusUpdate) -> Result<(), Self::Error>;
}
