//! C6 — public facade (§4.6).
//!
//! The one entry point external callers need: validate preconditions,
//! normalise the bid table (C1), build the dense run representation, drive
//! the outer loop (C5), and translate the result back into the externally
//! shaped `allocation`/`payments` maps.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::instance::Instance;
use crate::normalize::normalize;
use crate::outer_loop::run_outer_loop;
use crate::tracker::{NoopTracker, Tracker};
use crate::types::{Money, ProjectId, ProjectRange, RawBidTable, VoterId};

/// Per-project allocation, keyed by the caller's own project ids.
pub type Allocation = BTreeMap<ProjectId, Money>;

/// Per-project, per-voter payments, keyed by the caller's own ids.
pub type Payments = BTreeMap<ProjectId, BTreeMap<VoterId, Money>>;

/// Run metadata surfaced alongside the allocation — not part of the core
/// algorithm's contract, but useful to a caller inspecting a run (and to
/// the CLI's `--pretty` report).
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    pub rounds_run: u32,
    pub final_per_voter_budget: Money,
    pub hit_round_cap: bool,
}

/// Precondition checks only (§4.6) — no normalisation, no `Instance`, no
/// outer loop. Exposed at `pub(crate)` so `scenario::validate` can back
/// `mes check` with this alone, instead of paying for a full run just to
/// confirm the input is well-formed.
pub(crate) fn check_preconditions(
    voters: &[VoterId],
    project_ranges: &BTreeMap<ProjectId, ProjectRange>,
    bids: &RawBidTable,
    budget: Money,
) -> EngineResult<()> {
    if voters.is_empty() {
        return Err(EngineError::InvalidInput("voters must be non-empty".into()));
    }
    let mut seen_voters = std::collections::BTreeSet::new();
    for &v in voters {
        if !seen_voters.insert(v) {
            return Err(EngineError::InvalidInput(format!("duplicate voter id {v}")));
        }
    }
    if budget < Money::ZERO {
        return Err(EngineError::InvalidInput("budget must be >= 0".into()));
    }
    for (project, range) in project_ranges {
        if range.min_cost < Money::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "project {project}: min_cost must be >= 0"
            )));
        }
        if range.max_cost < range.min_cost {
            return Err(EngineError::InvalidInput(format!(
                "project {project}: max_cost must be >= min_cost"
            )));
        }
    }
    for (project, supporters) in bids {
        if !project_ranges.contains_key(project) {
            return Err(EngineError::InvalidInput(format!(
                "bid references unknown project {project}"
            )));
        }
        for (voter, amount) in supporters {
            if *amount < Money::ZERO {
                return Err(EngineError::InvalidInput(format!(
                    "bid amount for project {project}, voter {voter} must be >= 0"
                )));
            }
        }
    }
    Ok(())
}

/// Run the full pipeline (C1 → `Instance` → C5) and translate the outcome
/// back to externally-shaped maps, using a tracker the caller supplied.
pub fn compute_with_tracker(
    voters: &[VoterId],
    project_ranges: &BTreeMap<ProjectId, ProjectRange>,
    bids: &RawBidTable,
    budget: Money,
    config: &EngineConfig,
    tracker: &mut dyn Tracker,
) -> EngineResult<(Allocation, Payments, RunStats)> {
    check_preconditions(voters, project_ranges, bids, budget)?;

    let project_ids: Vec<ProjectId> = project_ranges.keys().copied().collect();
    let (normalized_bids, max_bid) = normalize(voters, &project_ids, bids);
    let instance = Instance::build(voters, project_ranges, &normalized_bids, &max_bid);

    let result = run_outer_loop(&instance, budget, config, tracker)?;

    let mut allocation = Allocation::new();
    let mut payments = Payments::new();
    for p in 0..instance.n_projects() {
        let project_id = instance.project_id(p);
        allocation.insert(project_id, result.output.allocation[p]);
        let mut per_voter = BTreeMap::new();
        for (&v, &amount) in &result.output.payments[p] {
            per_voter.insert(instance.voter_id(v), amount);
        }
        payments.insert(project_id, per_voter);
    }

    let stats = RunStats {
        rounds_run: result.rounds_run,
        final_per_voter_budget: result.final_per_voter_budget,
        hit_round_cap: result.hit_round_cap,
    };

    Ok((allocation, payments, stats))
}

/// Convenience wrapper over [`compute_with_tracker`] for callers that don't
/// need step-by-step observation.
pub fn compute(
    voters: &[VoterId],
    project_ranges: &BTreeMap<ProjectId, ProjectRange>,
    bids: &RawBidTable,
    budget: Money,
) -> EngineResult<(Allocation, Payments, RunStats)> {
    let config = EngineConfig::default();
    let mut tracker = NoopTracker;
    compute_with_tracker(voters, project_ranges, bids, budget, &config, &mut tracker)
}
