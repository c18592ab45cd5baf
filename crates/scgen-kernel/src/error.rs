// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for kernel collaborators

use crate::event::{Port, Receptor};

/// Errors raised by the host-side collaborators of a device
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// A configuration value was rejected; live state is untouched
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The target (or this node) does not accept the event on this receptor
    #[error("Unsupported receptor {receptor} on model {model}")]
    UnsupportedReceptor { receptor: Receptor, model: String },

    /// The connection itself is not allowed (e.g. mixed synapse types)
    #[error("Illegal connection: {0}")]
    IllegalConnection(String),

    /// A logging device asked for a field the model does not record
    #[error("Unknown recordable '{name}' on model {model}")]
    UnknownRecordable { name: String, model: String },

    /// No logging device is connected on this port
    #[error("Unknown logging port: {0}")]
    UnknownLoggingPort(Port),

    /// An update slice violated `0 <= from < to <= min_delay`
    #[error("Invalid step range [{from}, {to}) with min_delay {min_delay}")]
    InvalidStepRange { from: i64, to: i64, min_delay: i64 },

    /// `update` called before `calibrate`
    #[error("Node {0} must be calibrated before it is updated")]
    NotCalibrated(String),
}

pub type Result<T> = core::result::Result<T, KernelError>;
