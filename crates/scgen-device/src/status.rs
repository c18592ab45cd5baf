// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Status snapshots and key/value status updates.
//!
//! The configuration surface is a flat set of keys: the six parameter keys
//! (canonical or legacy spelling) plus the window keys `origin`, `start` and
//! `stop`. Keys are resolved to typed fields here, before anything touches the
//! live device.

use crate::error::{GeneratorError, Result};
use crate::parameters::{GeneratorParameters, ParameterKey, ParameterUpdate};
use scgen_kernel::{WindowStatus, WindowUpdate};
use serde::Serialize;
use serde_json::Value;

/// Everything `get_status` reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorStatus {
    pub model: String,
    #[serde(flatten)]
    pub parameters: GeneratorParameters,
    #[serde(flatten)]
    pub window: WindowStatus,
    pub recordables: Vec<String>,
}

/// A key of the status surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    Parameter(ParameterKey),
    Origin,
    Start,
    Stop,
}

impl StatusKey {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "origin" => Ok(StatusKey::Origin),
            "start" => Ok(StatusKey::Start),
            "stop" => Ok(StatusKey::Stop),
            other => ParameterKey::from_name(other)
                .map(StatusKey::Parameter)
                .ok_or_else(|| GeneratorError::invalid(other, "unknown status key")),
        }
    }
}

/// Partial update of parameters and window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusUpdate {
    pub parameters: ParameterUpdate,
    pub window: WindowUpdate,
}

impl StatusUpdate {
    pub fn set(&mut self, key: StatusKey, value: f64) {
        match key {
            StatusKey::Parameter(key) => self.parameters.set(key, value),
            StatusKey::Origin => self.window.origin = Some(value),
            StatusKey::Start => self.window.start = Some(value),
            StatusKey::Stop => self.window.stop = Some(value),
        }
    }

    /// Build an update from `(key, value)` pairs; later pairs win
    ///
    /// # Errors
    /// `InvalidParameter` on the first unknown key
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut update = StatusUpdate::default();
        for (name, value) in pairs {
            update.set(StatusKey::from_name(name)?, value);
        }
        Ok(update)
    }

    /// Build an update from a JSON object of numbers
    ///
    /// `stop` also accepts the strings `"inf"`/`"infinity"`, since JSON has no
    /// literal for an unbounded window.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| GeneratorError::invalid("<root>", "status update must be a JSON object"))?;

        let mut update = StatusUpdate::default();
        for (name, raw) in object {
            let key = StatusKey::from_name(name)?;
            let number = match (key, raw) {
                (_, Value::Number(n)) => n.as_f64(),
                (StatusKey::Stop, Value::String(s))
                    if matches!(s.to_ascii_lowercase().as_str(), "inf" | "+inf" | "infinity") =>
                {
                    Some(f64::INFINITY)
                }
                _ => None,
            }
            .ok_or_else(|| GeneratorError::invalid(name.as_str(), format!("expected a number, got {}", raw)))?;
            update.set(key, number);
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.window.is_empty()
    }
}

impl From<GeneratorParameters> for StatusUpdate {
    fn from(params: GeneratorParameters) -> Self {
        StatusUpdate {
            parameters: params.into(),
            window: WindowUpdate::default(),
        }
    }
}
