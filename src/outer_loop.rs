//! C5 — outer loop (§4.5).
//!
//! Repeatedly re-runs C4 (the fixed-budget round) at successively larger
//! per-voter budgets until the outcome is exhaustive (§4.5.1) or the next
//! larger budget would push the total allocation over the global budget,
//! in which case the last within-budget outcome is kept.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::instance::Instance;
use crate::round::{run_fbr, FbrOutput};
use crate::tracker::Tracker;
use crate::types::Money;

/// Result of C5: the committed allocation, plus how many escalation steps
/// it took and the per-voter budget level at which it was reached — used
/// by the facade to report P5's (budget-dependent) per-voter cap.
pub struct OuterLoopResult {
    pub output: FbrOutput,
    pub rounds_run: u32,
    pub final_per_voter_budget: Money,
    pub hit_round_cap: bool,
}

fn total_allocation(output: &FbrOutput) -> Money {
    output.allocation.iter().copied().sum()
}

fn is_exhaustive(instance: &Instance, output: &FbrOutput, budget: Money) -> bool {
    (0..instance.n_projects()).all(|p| {
        let next_cost = output.next_cost[p].external_value();
        let next_allocation = output.allocation[p] + next_cost;
        next_allocation > budget || next_allocation > instance.max_bid[p] || next_cost.is_zero()
    })
}

pub fn run_outer_loop(
    instance: &Instance,
    budget: Money,
    config: &EngineConfig,
    tracker: &mut dyn Tracker,
) -> EngineResult<OuterLoopResult> {
    let n_voters = instance.n_voters() as i64;

    let mut per_voter_budget = Money::from_micros(budget.micros() / n_voters);
    let increment = Money::from_micros((n_voters * budget.micros()) / config.distribution_parameter as i64);

    let mut current = run_fbr(instance, per_voter_budget, config, tracker)?;
    let mut rounds_run: u32 = 0;
    let mut hit_round_cap = false;

    loop {
        if is_exhaustive(instance, &current, budget) {
            break;
        }

        rounds_run += 1;
        if rounds_run > config.max_rounds {
            hit_round_cap = true;
            break;
        }

        let candidate_per_voter_budget = per_voter_budget + increment;
        let candidate = run_fbr(instance, candidate_per_voter_budget, config, tracker)?;

        if total_allocation(&candidate) > budget {
            break;
        }

        per_voter_budget = candidate_per_voter_budget;
        current = candidate;
    }

    Ok(OuterLoopResult {
        output: current,
        rounds_run,
        final_per_voter_budget: per_voter_budget,
        hit_round_cap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::normalize::normalize;
    use crate::tracker::NoopTracker;
    use crate::types::{ProjectRange, RawBidTable};
    use std::collections::BTreeMap;

    fn build(voters: &[u64], ranges: &[(u64, i64, i64)], raw_bids: &[(u64, u64, i64)]) -> Instance {
        let ranges_map: BTreeMap<_, _> = ranges
            .iter()
            .map(|&(p, min, max)| {
                (
                    p,
                    ProjectRange {
                        min_cost: Money::from_units(min),
                        max_cost: Money::from_units(max),
                    },
                )
            })
            .collect();
        let mut bids: RawBidTable = BTreeMap::new();
        for &(project, voter, amount) in raw_bids {
            bids.entry(project).or_default().insert(voter, Money::from_units(amount));
        }
        let project_ids: Vec<u64> = ranges_map.keys().copied().collect();
        let (normalized, max_bid) = normalize(voters, &project_ids, &bids);
        Instance::build(voters, &ranges_map, &normalized, &max_bid)
    }

    #[test]
    fn s5_budget_exceeds_ceiling_funds_to_max_bid() {
        let instance = build(&[1], &[(100, 500, 600)], &[(100, 1, 600)]);
        let cfg = EngineConfig::default();
        let mut tracker = NoopTracker;
        let result = run_outer_loop(&instance, Money::from_units(1000), &cfg, &mut tracker).unwrap();
        assert_eq!(result.output.allocation[0], Money::from_units(600));
    }

    #[test]
    fn s2_discrete_selection_with_increments() {
        let instance = build(
            &[1, 2],
            &[(11, 200, 700), (12, 300, 900), (13, 100, 100)],
            &[(11, 1, 500), (11, 2, 200), (12, 1, 300), (12, 2, 300), (13, 2, 100)],
        );
        let cfg = EngineConfig::default();
        let mut tracker = NoopTracker;
        let result = run_outer_loop(&instance, Money::from_units(900), &cfg, &mut tracker).unwrap();
        let by_id = |id: u64| instance.project_index(id).unwrap();
        assert_eq!(result.output.allocation[by_id(11)], Money::from_units(500));
        assert_eq!(result.output.allocation[by_id(12)], Money::from_units(300));
        assert_eq!(result.output.allocation[by_id(13)], Money::from_units(100));
    }

    #[test]
    fn outer_loop_never_exceeds_global_budget() {
        let instance = build(
            &[1, 2, 3],
            &[(11, 500, 600), (12, 500, 600), (13, 500, 600)],
            &[
                (11, 1, 500),
                (11, 2, 500),
                (11, 3, 500),
                (12, 1, 500),
                (12, 2, 500),
                (12, 3, 500),
                (13, 1, 500),
                (13, 2, 500),
                (13, 3, 500),
            ],
        );
        let cfg = EngineConfig::default();
        let mut tracker = NoopTracker;
        let result = run_outer_loop(&instance, Money::from_units(1500), &cfg, &mut tracker).unwrap();
        let total: Money = result.output.allocation.iter().copied().sum();
        assert!(total <= Money::from_units(1500));
    }

    #[test]
    fn larger_budget_never_decreases_total_allocation() {
        let instance = build(
            &[1, 2],
            &[(11, 200, 700), (12, 300, 900), (13, 100, 100)],
            &[(11, 1, 500), (11, 2, 200), (12, 1, 300), (12, 2, 300), (13, 2, 100)],
        );
        let cfg = EngineConfig::default();
        let small = run_outer_loop(&instance, Money::from_units(400), &cfg, &mut NoopTracker).unwrap();
        let large = run_outer_loop(&instance, Money::from_units(900), &cfg, &mut NoopTracker).unwrap();
        let total_small: Money = small.output.allocation.iter().copied().sum();
        let total_large: Money = large.output.allocation.iter().copied().sum();
        assert!(total_large >= total_small);
    }
}
