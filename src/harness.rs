// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sequential run harness
//!
//! Builds one generator per target distance from a [`ScgenConfig`], wires a
//! data-logging request into each, and steps them in min-delay slices. The
//! recorded samples are collected into a [`PopulationTrace`] matrix
//! (rows = sample times, columns = targets).

use ndarray::{Array2, ArrayView1, Axis};
use scgen_config::{validate_config, ConfigError, ScgenConfig};
use scgen_device::{GeneratorError, SaccadeCurrentGenerator, StatusUpdate};
use scgen_kernel::{
    DataLoggingRequest, EventBuffer, KernelError, Node, NodeId, Port, SimulationClock, StepRange,
};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Harness errors
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("Recorded traces disagree: {0}")]
    InconsistentTrace(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;

/// A validated run description derived from configuration
#[derive(Debug, Clone)]
pub struct RunPlan {
    clock: SimulationClock,
    total_steps: i64,
    request: DataLoggingRequest,
    update: StatusUpdate,
    distances: Vec<f64>,
}

impl RunPlan {
    /// Validate `config` and convert its millisecond settings to steps
    pub fn from_config(config: &ScgenConfig) -> Result<Self> {
        validate_config(config)?;

        let sim = &config.simulation;
        let grid = SimulationClock::new(sim.resolution_ms, 1)?;
        let clock = SimulationClock::new(sim.resolution_ms, grid.ms_to_steps(sim.min_delay_ms)?)?;
        let total_steps = clock.ms_to_steps(sim.duration_ms)?;
        let interval_steps = clock.ms_to_steps(config.recording.interval_ms)?;
        let request = DataLoggingRequest::new(config.recording.recordables.clone(), interval_steps)?;

        let gen = &config.generator;
        let mut pairs = vec![
            ("amplitude", gen.amplitude),
            ("decayRate", gen.decay_rate),
            ("shape", gen.shape),
            ("populationSize", gen.population_size),
            ("onset", gen.onset),
            ("origin", gen.origin),
            ("start", gen.start),
        ];
        if let Some(stop) = gen.stop {
            pairs.push(("stop", stop));
        }
        let update = StatusUpdate::from_pairs(pairs)?;

        Ok(Self {
            clock,
            total_steps,
            request,
            update,
            distances: config.target_distances(),
        })
    }

    pub fn clock(&self) -> SimulationClock {
        self.clock
    }

    pub fn total_steps(&self) -> i64 {
        self.total_steps
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Construct and configure the generators, one per distance
    pub fn build_population(&self) -> Result<Population> {
        let mut members = Vec::with_capacity(self.distances.len());
        for (index, &distance) in self.distances.iter().enumerate() {
            let mut generator = SaccadeCurrentGenerator::new(self.clock);
            generator.set_node_id(NodeId(index as u64 + 1));

            let mut update = self.update;
            update.parameters.distance = Some(distance);
            generator.set_status(&update)?;

            let port = generator.handles_logging_request(&self.request, 0)?;
            members.push((generator, port));
        }
        Ok(Population {
            clock: self.clock,
            recordables: self.request.recordables().to_vec(),
            distances: self.distances.clone(),
            members,
            sink: EventBuffer::new(),
            delivered_events: 0,
            next_step: 0,
        })
    }

    /// Build, calibrate and run the whole plan
    pub fn run(&self) -> Result<RunOutcome> {
        let mut population = self.build_population()?;
        population.prepare()?;
        population.advance(self.total_steps)?;
        let outcome = population.collect()?;
        info!(
            targets = self.distances.len(),
            steps = self.total_steps,
            delivered = outcome.delivered_events,
            "burst run complete"
        );
        Ok(outcome)
    }
}

/// Generators stepped together against one event sink
pub struct Population {
    clock: SimulationClock,
    recordables: Vec<String>,
    distances: Vec<f64>,
    members: Vec<(SaccadeCurrentGenerator, Port)>,
    sink: EventBuffer,
    delivered_events: usize,
    next_step: i64,
}

impl Population {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn generators(&self) -> impl Iterator<Item = &SaccadeCurrentGenerator> {
        self.members.iter().map(|(generator, _)| generator)
    }

    /// First step the next `advance` will process
    pub fn next_step(&self) -> i64 {
        self.next_step
    }

    /// Reset buffers and calibrate every member
    pub fn prepare(&mut self) -> Result<()> {
        for (generator, _) in &mut self.members {
            generator.init_buffers();
            generator.calibrate()?;
        }
        debug!(targets = self.members.len(), "population calibrated");
        Ok(())
    }

    /// Process `steps` further steps in slices of at most min-delay
    pub fn advance(&mut self, steps: i64) -> Result<()> {
        let end = self.next_step + steps.max(0);
        let min_delay = self.clock.min_delay_steps();
        while self.next_step < end {
            let slice = (end - self.next_step).min(min_delay);
            let range = StepRange::new(self.next_step, 0, slice, &self.clock)?;
            for (generator, _) in &mut self.members {
                generator.update(range, &mut self.sink)?;
            }
            self.delivered_events += self.sink.drain().len();
            self.next_step += slice;
        }
        Ok(())
    }

    /// Drain every member's logger into one trace per recordable
    pub fn collect(&mut self) -> Result<RunOutcome> {
        let mut replies = Vec::with_capacity(self.members.len());
        for (generator, port) in &mut self.members {
            replies.push(generator.handle_logging_request(*port)?);
        }

        let times_ms: Vec<f64> = replies
            .first()
            .map(|reply| reply.samples.iter().map(|s| s.time_ms).collect())
            .unwrap_or_default();
        if let Some(reply) = replies.iter().find(|r| r.samples.len() != times_ms.len()) {
            return Err(HarnessError::InconsistentTrace(format!(
                "port {} returned {} samples, expected {}",
                reply.port,
                reply.samples.len(),
                times_ms.len()
            )));
        }

        let traces = self
            .recordables
            .iter()
            .enumerate()
            .map(|(column, name)| {
                let values = Array2::from_shape_fn((times_ms.len(), replies.len()), |(row, target)| {
                    replies[target].samples[row].values[column]
                });
                PopulationTrace {
                    recordable: name.clone(),
                    times_ms: times_ms.clone(),
                    distances: self.distances.clone(),
                    values,
                }
            })
            .collect();

        Ok(RunOutcome {
            traces,
            delivered_events: std::mem::take(&mut self.delivered_events),
        })
    }
}

/// Traces plus the number of current events the targets received
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub traces: Vec<PopulationTrace>,
    pub delivered_events: usize,
}

/// One recordable sampled over time for every target
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationTrace {
    pub recordable: String,
    pub times_ms: Vec<f64>,
    pub distances: Vec<f64>,
    /// rows = samples, columns = targets
    pub values: Array2<f64>,
}

impl PopulationTrace {
    /// Samples of one target
    pub fn target(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    /// `(time_ms, value)` of each target's largest sample
    pub fn peaks(&self) -> Vec<Option<(f64, f64)>> {
        self.values
            .axis_iter(Axis(1))
            .map(|column| {
                column
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_nan())
                    .fold(None, |best: Option<(usize, f64)>, (row, &v)| match best {
                        Some((_, b)) if b >= v => best,
                        _ => Some((row, v)),
                    })
                    .map(|(row, v)| (self.times_ms[row], v))
            })
            .collect()
    }

    /// Header `time_ms,<recordable>@<distance>,...` then one line per sample
    pub fn to_csv(&self) -> String {
        let mut out = String::from("time_ms");
        for distance in &self.distances {
            out.push_str(&format!(",{}@{}", self.recordable, distance));
        }
        out.push('\n');
        for (row, time) in self.times_ms.iter().enumerate() {
            out.push_str(&time.to_string());
            for value in self.values.row(row) {
                out.push(',');
                out.push_str(&value.to_string());
            }
            out.push('\n');
        }
        out
    }

    /// Non-finite values serialize as `null`
    pub fn to_json(&self) -> Value {
        let rows: Vec<Vec<f64>> = self.values.outer_iter().map(|row| row.to_vec()).collect();
        json!({
            "recordable": self.recordable,
            "distances": self.distances,
            "times_ms": self.times_ms,
            "values": rows,
        })
    }
}
