// Monte Carlo reliability estimation
//
// Trials are independent: each one copies the canonical graph, knocks out
// edges at random, and classifies the result. The caller's random source is
// only used to draw one master seed per batch; every trial then runs on its
// own ChaCha stream keyed by the trial index, so the outcome of a batch does
// not depend on how rayon schedules it.

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::nr_delay::DelayModel;
use crate::nr_demand::DemandMatrix;
use crate::nr_error::{NetworkError, Result};
use crate::nr_graph::Graph;
use crate::nr_interface::TrialOutcome;
use crate::nr_routing::RoutingEngine;

/// Random source owned by a single trial
pub type TrialRng = ChaCha8Rng;

fn trial_rng(master_seed: u64, trial: usize) -> TrialRng {
    let mut rng = ChaCha8Rng::seed_from_u64(master_seed);
    rng.set_stream(trial as u64);
    rng
}

fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(NetworkError::InvalidConfig(format!(
            "survival probability must be within [0, 1], got {}",
            p
        )));
    }
    Ok(())
}

/// Per-outcome counts for one batch of trials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReliabilityReport {
    pub trials: usize,
    pub reliable: usize,
    pub overloaded: usize,
    pub delay_exceeded: usize,
    pub disconnected: usize,
}

impl ReliabilityReport {
    pub fn record(&mut self, outcome: TrialOutcome) {
        self.trials += 1;
        match outcome {
            TrialOutcome::Reliable => self.reliable += 1,
            TrialOutcome::Overloaded => self.overloaded += 1,
            TrialOutcome::DelayExceeded => self.delay_exceeded += 1,
            TrialOutcome::Disconnected => self.disconnected += 1,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            trials: self.trials + other.trials,
            reliable: self.reliable + other.reliable,
            overloaded: self.overloaded + other.overloaded,
            delay_exceeded: self.delay_exceeded + other.delay_exceeded,
            disconnected: self.disconnected + other.disconnected,
        }
    }

    /// Fraction of reliable trials, in [0, 1]
    pub fn ratio(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.reliable as f64 / self.trials as f64
    }
}

/// Drives randomized failure trials over a graph and demand matrix
#[derive(Debug, Clone, Copy)]
pub struct ReliabilityEstimator {
    routing: RoutingEngine,
    delay: DelayModel,
    max_delay: f64,
}

impl ReliabilityEstimator {
    pub fn new(routing: RoutingEngine, delay: DelayModel, max_delay: f64) -> Result<Self> {
        if !(max_delay.is_finite() && max_delay > 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "maximum delay must be positive, got {}",
                max_delay
            )));
        }
        Ok(Self {
            routing,
            delay,
            max_delay,
        })
    }

    pub fn max_delay(&self) -> f64 {
        self.max_delay
    }

    /// Classify a single topology as-is, without removing anything
    pub fn classify(&self, graph: &Graph, demand: &DemandMatrix) -> Result<TrialOutcome> {
        if !graph.is_connected() {
            return Ok(TrialOutcome::Disconnected);
        }

        let load = self.routing.compute_load(graph, demand)?;
        if self.delay.is_overloaded(graph, &load)? {
            return Ok(TrialOutcome::Overloaded);
        }

        let delay = self.delay.mean_delay(graph, &load, demand)?;
        if delay.is_within(self.max_delay) {
            Ok(TrialOutcome::Reliable)
        } else {
            Ok(TrialOutcome::DelayExceeded)
        }
    }

    /// One trial: every edge of a working copy survives with probability `p`
    pub fn run_trial<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        demand: &DemandMatrix,
        survival_probability: f64,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        check_probability(survival_probability)?;
        let mut damaged = graph.clone();
        damaged.retain_edges(|_, _| rng.gen_bool(survival_probability));
        self.classify(&damaged, demand)
    }

    /// Run `trials` independent trials and count their outcomes.
    ///
    /// Configuration errors are reported before any trial runs.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        demand: &DemandMatrix,
        survival_probability: f64,
        trials: usize,
        rng: &mut R,
    ) -> Result<ReliabilityReport> {
        if trials == 0 {
            return Err(NetworkError::InvalidConfig(
                "trial count must be at least 1".to_string(),
            ));
        }
        check_probability(survival_probability)?;
        demand.ensure_size(graph.node_count())?;

        let master_seed: u64 = rng.gen();

        let report = (0..trials)
            .into_par_iter()
            .map(|trial| -> Result<TrialOutcome> {
                let mut rng = trial_rng(master_seed, trial);
                let outcome = self.run_trial(graph, demand, survival_probability, &mut rng)?;
                trace!("trial {}: {:?}", trial, outcome);
                Ok(outcome)
            })
            .try_fold(ReliabilityReport::default, |mut report, outcome| {
                report.record(outcome?);
                Ok::<_, NetworkError>(report)
            })
            .try_reduce(ReliabilityReport::default, |a, b| Ok(a.merge(b)))?;

        debug!(
            "p={} trials={} reliable={} overloaded={} delay_exceeded={} disconnected={}",
            survival_probability,
            report.trials,
            report.reliable,
            report.overloaded,
            report.delay_exceeded,
            report.disconnected
        );

        Ok(report)
    }
}
