// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Saccade Current Generator Device
//!
//! ## Per-step update
//!
//! ```text
//! for lag in [from, to):
//!     τ = (origin + lag) × resolution
//!     I = burst_current(params, τ)          // always, even when inactive
//!     state.I = active(step) ? I : 0
//!     if active: send CurrentEvent(I) at lag
//!     logger.record_data(step, state)
//! ```
//!
//! The burst is evaluated on every step whether or not the device is active:
//! the activation window masks the output, it never restarts the burst.

use crate::error::{GeneratorError, Result};
use crate::parameters::GeneratorParameters;
use crate::profile::burst_current;
use crate::status::{GeneratorStatus, StatusUpdate};
use once_cell::sync::Lazy;
use scgen_kernel::{
    CurrentEvent, CurrentEventTarget, DataLogger, DataLoggingReply, DataLoggingRequest,
    EventSink, KernelError, Node, NodeId, Port, Receptor, RecordablesMap, SimulationClock,
    StepRange, StimulatingDevice, SynIndex,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Model name reported in status and errors
pub const MODEL_NAME: &str = "sc_generator";

static RECORDABLES: Lazy<RecordablesMap<GeneratorState>> = Lazy::new(|| {
    let mut map = RecordablesMap::new();
    map.insert("I", GeneratorState::current);
    map
});

/// Recordable fields of the generator, shared by all instances
pub fn recordables() -> &'static RecordablesMap<GeneratorState> {
    &RECORDABLES
}

/// Per-step tracing of computed currents.
/// Enable with SCGEN_TRACE_CURRENT=1
static TRACE_CURRENT: Lazy<bool> = Lazy::new(|| {
    std::env::var("SCGEN_TRACE_CURRENT")
        .map(|v| trace_flag_set(&v))
        .unwrap_or(false)
});

fn trace_flag_set(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Dynamic state of the generator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GeneratorState {
    /// Instantaneous current (pA); zero while the device is inactive
    current: f64,
}

impl GeneratorState {
    pub fn current(&self) -> f64 {
        self.current
    }
}

/// Where a generator is in its run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Constructed,
    Calibrated,
    Running,
}

struct Buffers {
    logger: DataLogger<GeneratorState>,
}

impl Buffers {
    fn new(clock: SimulationClock) -> Self {
        Self {
            logger: DataLogger::new(MODEL_NAME, clock),
        }
    }
}

/// Stimulation device emitting a saccade-related burst current
pub struct SaccadeCurrentGenerator {
    node_id: NodeId,
    clock: SimulationClock,
    device: StimulatingDevice,
    params: GeneratorParameters,
    state: GeneratorState,
    buffers: Buffers,
    lifecycle: Lifecycle,
}

impl SaccadeCurrentGenerator {
    /// Create a generator with default parameters on the given step grid
    pub fn new(clock: SimulationClock) -> Self {
        Lazy::force(&RECORDABLES);
        Self {
            node_id: NodeId::default(),
            clock,
            device: StimulatingDevice::new(clock),
            params: GeneratorParameters::default(),
            state: GeneratorState::default(),
            buffers: Buffers::new(clock),
            lifecycle: Lifecycle::Constructed,
        }
    }

    /// Create a generator and apply `params` through the validated path
    pub fn with_parameters(clock: SimulationClock, params: GeneratorParameters) -> Result<Self> {
        let mut generator = Self::new(clock);
        generator.set_parameters(params)?;
        Ok(generator)
    }

    pub fn get_parameters(&self) -> GeneratorParameters {
        self.params
    }

    /// Replace the whole parameter set; all-or-nothing
    pub fn set_parameters(&mut self, candidate: GeneratorParameters) -> Result<()> {
        self.set_status(&StatusUpdate::from(candidate))
    }

    /// Last reported current (pA)
    pub fn instantaneous_current(&self) -> f64 {
        self.state.current
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    /// Whether output computed at `step` is delivered
    pub fn is_active(&self, step: i64) -> bool {
        self.device.is_active(step)
    }
}

impl Clone for SaccadeCurrentGenerator {
    /// Copies configuration and state; the copy starts with fresh buffers
    /// and must be calibrated again.
    fn clone(&self) -> Self {
        Self {
            node_id: self.node_id,
            clock: self.clock,
            device: self.device.clone(),
            params: self.params,
            state: self.state,
            buffers: Buffers::new(self.clock),
            lifecycle: Lifecycle::Constructed,
        }
    }
}

impl std::fmt::Debug for SaccadeCurrentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaccadeCurrentGenerator")
            .field("node_id", &self.node_id)
            .field("params", &self.params)
            .field("window", &self.device.get_status())
            .field("state", &self.state)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl Node for SaccadeCurrentGenerator {
    type Status = GeneratorStatus;
    type StatusUpdate = StatusUpdate;
    type Error = GeneratorError;

    fn model_name(&self) -> &'static str {
        MODEL_NAME
    }

    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn set_node_id(&mut self, id: NodeId) {
        self.node_id = id;
    }

    fn has_proxies(&self) -> bool {
        false
    }

    fn local_receiver(&self) -> bool {
        true
    }

    fn init_state(&mut self, proto: &Self) {
        self.state = proto.state;
    }

    fn init_buffers(&mut self) {
        self.buffers.logger.reset();
        self.state = GeneratorState::default();
    }

    fn calibrate(&mut self) -> Result<()> {
        self.buffers.logger.init();
        self.device.calibrate()?;

        // 0^shape with shape < 0 is +inf; reachable whenever τ <= onset
        if self.params.shape < 0.0 && self.params.onset >= 0.0 && self.params.amplitude != 0.0 {
            warn!(
                node = %self.node_id,
                shape = self.params.shape,
                onset = self.params.onset,
                "negative shape: current is infinite until onset has passed"
            );
        }

        if self.lifecycle == Lifecycle::Constructed {
            self.lifecycle = Lifecycle::Calibrated;
        }
        debug!(node = %self.node_id, lifecycle = ?self.lifecycle, "{} calibrated", MODEL_NAME);
        Ok(())
    }

    fn update(&mut self, range: StepRange, sink: &mut dyn EventSink) -> Result<()> {
        if self.lifecycle == Lifecycle::Constructed {
            return Err(KernelError::NotCalibrated(format!("{} {}", MODEL_NAME, self.node_id)).into());
        }
        self.lifecycle = Lifecycle::Running;

        let trace_current = *TRACE_CURRENT;
        let mut event = CurrentEvent::default();

        for lag in range.lags() {
            let step = range.step(lag);
            let current = burst_current(&self.params, self.clock.step_to_ms(step));

            self.state.current = 0.0;
            if self.device.is_active(step) {
                self.state.current = current;
                event.set_current(current);
                sink.send_current(self.node_id, event, lag);
            }

            if trace_current {
                trace!(
                    node = %self.node_id,
                    step,
                    lag,
                    computed = current,
                    reported = self.state.current,
                    "burst current"
                );
            }

            self.buffers.logger.record_data(step, &self.state);
        }
        Ok(())
    }

    fn send_test_event(
        &mut self,
        target: &dyn CurrentEventTarget,
        receptor: Receptor,
        syn_id: SynIndex,
    ) -> Result<Port> {
        self.device.enforce_single_syn_type(syn_id)?;
        Ok(target.handles_current_event(receptor)?)
    }

    fn handles_logging_request(
        &mut self,
        request: &DataLoggingRequest,
        receptor: Receptor,
    ) -> Result<Port> {
        if receptor != 0 {
            return Err(KernelError::UnsupportedReceptor {
                receptor,
                model: MODEL_NAME.to_string(),
            }
            .into());
        }
        Ok(self
            .buffers
            .logger
            .connect_logging_device(request, &RECORDABLES)?)
    }

    fn handle_logging_request(&mut self, port: Port) -> Result<DataLoggingReply> {
        Ok(self.buffers.logger.handle(port)?)
    }

    fn get_status(&self) -> GeneratorStatus {
        GeneratorStatus {
            model: MODEL_NAME.to_string(),
            parameters: self.params,
            window: self.device.get_status(),
            recordables: RECORDABLES.get_list(),
        }
    }

    fn set_status(&mut self, update: &StatusUpdate) -> Result<()> {
        // temporary copy in case of errors
        let mut candidate = self.params;
        candidate.apply(&update.parameters);
        candidate.validate()?;

        // candidate is consistent; commit it only once the window accepts too
        self.device.set_status(&update.window)?;

        self.params = candidate;
        debug!(node = %self.node_id, params = ?self.params, "{} parameters updated", MODEL_NAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scgen_kernel::EventBuffer;

    fn clock() -> SimulationClock {
        SimulationClock::new(1.0, 10).unwrap()
    }

    fn burst() -> GeneratorParameters {
        GeneratorParameters {
            amplitude: 2.0,
            decay_rate: 0.1,
            shape: 2.0,
            population_size: 1.0,
            distance: 0.0,
            onset: 5.0,
        }
    }

    struct Neuron;

    impl CurrentEventTarget for Neuron {
        fn model_name(&self) -> &str {
            "iaf_psc_alpha"
        }

        fn handles_current_event(&self, receptor: Receptor) -> scgen_kernel::Result<Port> {
            if receptor == 0 {
                Ok(0)
            } else {
                Err(KernelError::UnsupportedReceptor {
                    receptor,
                    model: self.model_name().to_string(),
                })
            }
        }
    }

    #[test]
    fn test_update_requires_calibration() {
        let mut generator = SaccadeCurrentGenerator::new(clock());
        let range = StepRange::new(0, 0, 5, &clock()).unwrap();
        let err = generator.update(range, &mut EventBuffer::new()).unwrap_err();
        assert!(matches!(err, GeneratorError::Kernel(KernelError::NotCalibrated(_))));
        assert_eq!(generator.lifecycle(), Lifecycle::Constructed);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut generator = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        generator.calibrate().unwrap();
        assert_eq!(generator.lifecycle(), Lifecycle::Calibrated);

        let range = StepRange::new(0, 0, 10, &clock()).unwrap();
        generator.update(range, &mut EventBuffer::new()).unwrap();
        assert_eq!(generator.lifecycle(), Lifecycle::Running);

        // re-calibration between runs never goes back
        generator.calibrate().unwrap();
        assert_eq!(generator.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn test_events_carry_sender_and_lag() {
        let mut generator = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        generator.set_node_id(NodeId(7));
        generator.calibrate().unwrap();

        let mut sink = EventBuffer::new();
        let range = StepRange::new(10, 0, 10, &clock()).unwrap();
        generator.update(range, &mut sink).unwrap();

        assert_eq!(sink.len(), 10);
        for (lag, event) in sink.events().iter().enumerate() {
            assert_eq!(event.sender, NodeId(7));
            assert_eq!(event.lag, lag as i64);
            let expected = burst_current(&burst(), (10 + lag) as f64);
            assert_eq!(event.current, expected);
        }
        assert_eq!(
            generator.instantaneous_current(),
            burst_current(&burst(), 19.0)
        );
    }

    #[test]
    fn test_status_reports_parameters_window_and_recordables() {
        let generator = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        let status = generator.get_status();
        assert_eq!(status.model, "sc_generator");
        assert_eq!(status.parameters, burst());
        assert_eq!(status.window.stop, f64::INFINITY);
        assert_eq!(status.recordables, vec!["I".to_string()]);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["shape"], 2.0);
        assert_eq!(json["start"], 0.0);
    }

    #[test]
    fn test_set_status_partial_update() {
        let mut generator = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        let update = StatusUpdate::from_pairs([("gamma", 3.0), ("start", 4.0)]).unwrap();
        generator.set_status(&update).unwrap();

        let status = generator.get_status();
        assert_eq!(status.parameters.shape, 3.0);
        assert_eq!(status.parameters.amplitude, 2.0);
        assert_eq!(status.window.start, 4.0);
    }

    #[test]
    fn test_connection_checks() {
        let mut generator = SaccadeCurrentGenerator::new(clock());
        assert_eq!(generator.send_test_event(&Neuron, 0, 1).unwrap(), 0);

        let err = generator.send_test_event(&Neuron, 3, 1).unwrap_err();
        assert!(err.is_unsupported_receptor());

        let err = generator.send_test_event(&Neuron, 0, 2).unwrap_err();
        assert!(matches!(err, GeneratorError::Kernel(KernelError::IllegalConnection(_))));
    }

    #[test]
    fn test_logging_request_receptor_and_recordables() {
        let mut generator = SaccadeCurrentGenerator::new(clock());
        let request = DataLoggingRequest::new(vec!["I".into()], 1).unwrap();
        assert!(generator
            .handles_logging_request(&request, 1)
            .unwrap_err()
            .is_unsupported_receptor());
        assert_eq!(generator.handles_logging_request(&request, 0).unwrap(), 1);

        let bad = DataLoggingRequest::new(vec!["V_m".into()], 1).unwrap();
        assert!(matches!(
            generator.handles_logging_request(&bad, 0),
            Err(GeneratorError::Kernel(KernelError::UnknownRecordable { .. }))
        ));
    }

    #[test]
    fn test_clone_has_fresh_buffers() {
        let mut generator = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        let request = DataLoggingRequest::new(vec!["I".into()], 1).unwrap();
        let port = generator.handles_logging_request(&request, 0).unwrap();

        let mut copy = generator.clone();
        assert_eq!(copy.get_parameters(), burst());
        assert_eq!(copy.lifecycle(), Lifecycle::Constructed);
        assert!(matches!(
            copy.handle_logging_request(port),
            Err(GeneratorError::Kernel(KernelError::UnknownLoggingPort(_)))
        ));
    }

    #[test]
    fn test_init_state_and_buffers() {
        let mut proto = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        proto.calibrate().unwrap();
        let range = StepRange::new(20, 0, 1, &clock()).unwrap();
        proto.update(range, &mut EventBuffer::new()).unwrap();
        assert!(proto.instantaneous_current() > 0.0);

        let mut fresh = SaccadeCurrentGenerator::new(clock());
        fresh.init_state(&proto);
        assert_eq!(fresh.instantaneous_current(), proto.instantaneous_current());

        fresh.init_buffers();
        assert_eq!(fresh.instantaneous_current(), 0.0);
    }

    #[test]
    fn test_node_flags() {
        let generator = SaccadeCurrentGenerator::new(clock());
        assert!(!generator.has_proxies());
        assert!(generator.local_receiver());
        assert_eq!(recordables().len(), 1);
    }

    #[test]
    fn test_lazy_statics_are_initialised_once() {
        let first = recordables();
        let _generator = SaccadeCurrentGenerator::new(clock());
        assert!(std::ptr::eq(first, recordables()));

        assert_eq!(*TRACE_CURRENT, *TRACE_CURRENT);
        assert!(trace_flag_set("1"));
        assert!(trace_flag_set("TRUE"));
        assert!(!trace_flag_set("0"));
        assert!(!trace_flag_set("yes"));
    }

    #[test]
    fn test_vanishing_population_size_is_rejected() {
        let params = GeneratorParameters {
            population_size: 1e-200,
            ..burst()
        };
        assert!(matches!(
            SaccadeCurrentGenerator::with_parameters(clock(), params),
            Err(GeneratorError::InvalidParameter { .. })
        ));

        let mut generator = SaccadeCurrentGenerator::with_parameters(clock(), burst()).unwrap();
        assert!(generator.set_parameters(params).is_err());
        assert_eq!(generator.get_parameters(), burst());
        assert!(generator.instantaneous_current().is_finite());
    }
}
