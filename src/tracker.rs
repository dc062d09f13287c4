//! Optional observation hook into C4's project-selection steps (§4.5.3).
//!
//! Modeled as a one-method trait rather than a plain function pointer so a
//! caller can carry state (e.g. an in-memory trace buffer) across steps
//! without a closure capturing `&mut` awkwardly. [`NoopTracker`] is the
//! default, zero-cost implementation — no branch-per-call overhead, no
//! process-wide logger, nothing observed unless the caller asks for it.

use crate::types::{Money, ProjectId, VoterId};
use std::collections::BTreeMap;

/// A snapshot of one FBR project-selection step. Every field is an owned
/// copy — the tracker must not be able to mutate engine state through it.
#[derive(Debug, Clone)]
pub struct StepSnapshot {
    pub project: ProjectId,
    pub increment: Money,
    /// Effective vote count observed this step for every still-live
    /// candidate, keyed by project id. `f64` here is display-only telemetry
    /// (§5) — nothing in the engine compares on this value.
    pub effective_vote_counts: BTreeMap<ProjectId, f64>,
    /// Remaining per-voter budget after this step's payments were deducted.
    pub voter_budgets: BTreeMap<VoterId, Money>,
    /// This step's payments only (not the project's cumulative allocation).
    pub payments_this_step: BTreeMap<VoterId, Money>,
}

pub trait Tracker {
    fn on_step(&mut self, snapshot: &StepSnapshot);
}

/// Zero-cost default: observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl Tracker for NoopTracker {
    fn on_step(&mut self, _snapshot: &StepSnapshot) {}
}

/// A tracker that keeps every snapshot it was given, in order. Useful for
/// tests and for the CLI's `--pretty` report.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    pub steps: Vec<StepSnapshot>,
}

impl Tracker for RecordingTracker {
    fn on_step(&mut self, snapshot: &StepSnapshot) {
        self.steps.push(snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> StepSnapshot {
        StepSnapshot {
            project: 11,
            increment: Money::from_units(100),
            effective_vote_counts: BTreeMap::new(),
            voter_budgets: BTreeMap::new(),
            payments_this_step: BTreeMap::new(),
        }
    }

    #[test]
    fn noop_tracker_observes_nothing_but_does_not_panic() {
        let mut tracker = NoopTracker;
        tracker.on_step(&sample_snapshot());
    }

    #[test]
    fn recording_tracker_accumulates_steps_in_order() {
        let mut tracker = RecordingTracker::default();
        tracker.on_step(&sample_snapshot());
        let mut second = sample_snapshot();
        second.project = 12;
        tracker.on_step(&second);
        assert_eq!(tracker.steps.len(), 2);
        assert_eq!(tracker.steps[0].project, 11);
        assert_eq!(tracker.steps[1].project, 12);
    }
}
