//! C7 — scenario I/O (§4.7).
//!
//! Adapts the on-disk JSON scenario format to C6's input shapes, and
//! [`compute`](crate::facade::compute)'s output back to a serialisable
//! report. Not part of the algorithmic core — exists so the crate is
//! runnable end-to-end from the CLI without a host application.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::facade::{Allocation, Payments, RunStats};
use crate::types::{Money, ProjectId, ProjectRange, RawBidTable, VoterId};

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioProject {
    pub id: ProjectId,
    pub min_cost: i64,
    pub max_cost: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioBid {
    pub project: ProjectId,
    pub voter: VoterId,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub voters: Vec<VoterId>,
    pub projects: Vec<ScenarioProject>,
    #[serde(default)]
    pub bids: Vec<ScenarioBid>,
    pub budget: i64,
}

impl Scenario {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scenario file {}", path.display()))?;
        Ok(scenario)
    }

    /// Translate this scenario into `compute`'s argument shapes. Does not
    /// check preconditions itself — the facade does that, uniformly, on
    /// every call site.
    pub fn into_inputs(
        &self,
    ) -> (Vec<VoterId>, BTreeMap<ProjectId, ProjectRange>, RawBidTable, Money) {
        let project_ranges: BTreeMap<ProjectId, ProjectRange> = self
            .projects
            .iter()
            .map(|p| {
                (
                    p.id,
                    ProjectRange {
                        min_cost: Money::from_units(p.min_cost),
                        max_cost: Money::from_units(p.max_cost),
                    },
                )
            })
            .collect();

        let mut bids: RawBidTable = BTreeMap::new();
        for bid in &self.bids {
            bids.entry(bid.project)
                .or_default()
                .insert(bid.voter, Money::from_units(bid.amount));
        }

        (self.voters.clone(), project_ranges, bids, Money::from_units(self.budget))
    }
}

/// A run's allocation and payments, plus the escalation metadata C5
/// accumulated, in a shape serialisable straight to the scenario report.
#[derive(Debug, Serialize)]
pub struct Report {
    pub allocation: Allocation,
    pub payments: Payments,
    pub rounds_run: u32,
    pub final_per_voter_budget: Money,
    pub hit_round_cap: bool,
}

impl Report {
    pub fn new(allocation: Allocation, payments: Payments, stats: RunStats) -> Self {
        Report {
            allocation,
            payments,
            rounds_run: stats.rounds_run,
            final_per_voter_budget: stats.final_per_voter_budget,
            hit_round_cap: stats.hit_round_cap,
        }
    }
}

/// Validate a scenario's preconditions without running `compute` — backs
/// the CLI's `mes check` subcommand. Calls `facade::check_preconditions`
/// directly rather than `facade::compute`, so a scenario that is
/// well-formed but happens to trip an internal algorithm failure
/// (`TieUnresolved`, `NotFullyFunded`) is still reported as valid here,
/// and no O(rounds) computation runs for what is an O(projects + bids)
/// check.
pub fn validate(scenario: &Scenario) -> Result<(), EngineError> {
    let (voters, project_ranges, bids, budget) = scenario.into_inputs();
    crate::facade::check_preconditions(&voters, &project_ranges, &bids, budget)
}
