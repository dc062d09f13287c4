//! C4 — fixed-budget round (FBR) (§4.4).
//!
//! Gives every voter an identical starting budget and repeatedly funds the
//! project with the highest effective vote count — at its minimum cost
//! while *discrete*, in bounded increments while *continuous* — until
//! nothing affordable remains. This is the state machine the rest of the
//! engine (C5's outer loop) drives at successively larger per-voter
//! budgets.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::distribute::distribute;
use crate::error::{EngineError, EngineResult};
use crate::instance::Instance;
use crate::tie_break::break_tie;
use crate::tracker::{StepSnapshot, Tracker};
use crate::types::Money;

/// `CONTINUOUS_COST` (§6.2): the surrogate "current cost" used for a
/// continuous-phase project in the affordability/effective-vote-count
/// computation, in the same units as `min_cost`/`max_cost`. Never compared
/// to a real project cost for ordering — §9 models it as a distinct enum
/// variant precisely so it can never collide with one.
const CONTINUOUS_COST: Money = Money::from_micros(crate::types::MICRO);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectPhase {
    Discrete,
    Continuous,
    Retired,
}

/// The cost at which a project would next be considered, tagged so a real
/// monetary cost can never be confused with the continuous-phase sentinel
/// or with "retired, no further increment possible" (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextCost {
    Fixed(Money),
    Continuous,
    None,
}

impl NextCost {
    fn as_money(self) -> Option<Money> {
        match self {
            NextCost::Fixed(m) => Some(m),
            NextCost::Continuous => Some(CONTINUOUS_COST),
            NextCost::None => None,
        }
    }

    /// The value C5 examines for its exhaustiveness check (§4.5.1): zero
    /// once retired, since condition (iii) is `nextCost(p) ≤ 0`.
    pub fn external_value(self) -> Money {
        self.as_money().unwrap_or(Money::ZERO)
    }
}

pub struct FbrOutput {
    pub allocation: Vec<Money>,
    pub next_cost: Vec<NextCost>,
    pub payments: Vec<BTreeMap<usize, Money>>,
}

/// An effective-vote-count value kept as `cost * denom / remaining` without
/// ever dividing, so ties compare exactly (§9: "prefer comparing the
/// reciprocal integer quantity"). `remaining == 0` means the selection
/// walk found a supporter who owes nothing at all, which is the highest
/// possible support strength a project can have.
#[derive(Debug, Clone, Copy)]
struct Evc {
    cost: Money,
    denom: i64,
    remaining: Money,
}

impl Evc {
    fn cmp_strength(&self, other: &Evc) -> Ordering {
        match (self.remaining.is_zero(), other.remaining.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let a = self.cost.micros() as i128 * self.denom as i128 * other.remaining.micros() as i128;
                let b = other.cost.micros() as i128 * other.denom as i128 * self.remaining.micros() as i128;
                a.cmp(&b)
            }
        }
    }

    fn as_f64(&self) -> f64 {
        if self.remaining.is_zero() {
            f64::INFINITY
        } else {
            (self.cost.micros() as f64 * self.denom as f64) / self.remaining.micros() as f64
        }
    }
}

/// Walk `supporters` (already sorted by ascending current budget, ties by
/// ascending voter index) as the cascading split in §4.2/§4.4.3 step 2
/// does, and return the effective-vote-count of `cost` at that support
/// level, or `None` if the supporters can't cover `cost` at all (the
/// caller is expected to have already checked affordability).
fn effective_vote_count(cost: Money, supporters: &[usize], voter_budget: &[Money]) -> Option<Evc> {
    let denom_total = supporters.len() as i64;
    let mut paid_so_far = Money::ZERO;
    let mut denom = denom_total;
    for &v in supporters {
        let remaining_for_candidate = cost.saturating_sub(paid_so_far);
        let budget_v = voter_budget[v];
        let affordable = budget_v
            .micros()
            .checked_mul(denom)
            .map_or(true, |x| x >= remaining_for_candidate.micros());
        if affordable {
            return Some(Evc {
                cost,
                denom,
                remaining: remaining_for_candidate,
            });
        }
        paid_so_far += budget_v;
        denom -= 1;
    }
    None
}

/// Run one fixed-budget round over `instance` at `per_voter_budget`.
pub fn run_fbr(
    instance: &Instance,
    per_voter_budget: Money,
    config: &EngineConfig,
    tracker: &mut dyn Tracker,
) -> EngineResult<FbrOutput> {
    let _ = config; // FBR itself has no tunables; kept for a uniform call signature with C5.
    let n_projects = instance.n_projects();
    let n_voters = instance.n_voters();

    let mut voter_budget = vec![per_voter_budget; n_voters];
    let mut allocation = vec![Money::ZERO; n_projects];
    let mut phase = vec![ProjectPhase::Retired; n_projects];
    let mut next_cost = vec![NextCost::None; n_projects];
    let mut working_bids: Vec<Vec<(usize, Money)>> = instance.bids.clone();
    let mut payments: Vec<BTreeMap<usize, Money>> = vec![BTreeMap::new(); n_projects];

    for p in 0..n_projects {
        if instance.min_cost[p].is_positive() && !working_bids[p].is_empty() {
            phase[p] = ProjectPhase::Discrete;
            next_cost[p] = NextCost::Fixed(instance.min_cost[p]);
        }
    }

    loop {
        let mut best: Option<Evc> = None;
        let mut best_candidates: Vec<usize> = Vec::new();
        let mut round_evc: BTreeMap<usize, Evc> = BTreeMap::new();

        for p in 0..n_projects {
            if phase[p] == ProjectPhase::Retired {
                continue;
            }
            let current_cost = next_cost[p].as_money().expect("non-retired project has a cost");

            let money_behind: Money = working_bids[p].iter().map(|&(v, _)| voter_budget[v]).sum();
            if money_behind < current_cost {
                // Not affordable at this round's per-voter budget, but not
                // exhausted either: leave `next_cost[p]` as-is (still
                // `Fixed(min_cost)` or `Continuous`) so C5's exhaustiveness
                // check (§4.5.1) can tell a larger per-voter budget might
                // still fund it. Only a fully-funded retirement (below)
                // reports `NextCost::None`.
                phase[p] = ProjectPhase::Retired;
                continue;
            }

            let mut supporters: Vec<usize> = working_bids[p].iter().map(|&(v, _)| v).collect();
            supporters.sort_by(|&a, &b| voter_budget[a].cmp(&voter_budget[b]).then(a.cmp(&b)));

            let evc = effective_vote_count(current_cost, &supporters, &voter_budget)
                .expect("affordability was already checked above");
            round_evc.insert(p, evc);

            match &best {
                None => {
                    best = Some(evc);
                    best_candidates = vec![p];
                }
                Some(current_best) => match evc.cmp_strength(current_best) {
                    Ordering::Greater => {
                        best = Some(evc);
                        best_candidates = vec![p];
                    }
                    Ordering::Equal => best_candidates.push(p),
                    Ordering::Less => {}
                },
            }
        }

        if best_candidates.is_empty() {
            break;
        }

        let chosen = break_tie(
            &best_candidates.iter().map(|&p| instance.project_id(p)).collect::<Vec<_>>(),
            |id| next_cost[instance.project_index(id).unwrap()].as_money().unwrap(),
            |id| working_bids[instance.project_index(id).unwrap()].len(),
        )?;
        let c = instance.project_index(chosen).unwrap();

        let increment = if phase[c] == ProjectPhase::Discrete {
            instance.min_cost[c]
        } else {
            let active_supporters: Vec<(usize, Money)> = working_bids[c]
                .iter()
                .copied()
                .filter(|&(v, bid)| bid.is_positive() && voter_budget[v].is_positive())
                .collect();
            let remaining_ceiling = instance.max_bid[c].saturating_sub(allocation[c]);
            let smallest_active_bid = active_supporters
                .iter()
                .map(|&(_, bid)| bid)
                .min()
                .unwrap_or(Money::ZERO);
            let money_behind: Money = active_supporters.iter().map(|&(v, _)| voter_budget[v]).sum();
            remaining_ceiling.min(smallest_active_bid).min(money_behind)
        };

        let supporter_budgets: Vec<(usize, Money)> = working_bids[c]
            .iter()
            .map(|&(v, _)| (v, voter_budget[v]))
            .collect();
        let contributions = distribute(increment, &supporter_budgets).map_err(|err| match err {
            EngineError::NotFullyFunded { cost, remaining, .. } => EngineError::NotFullyFunded {
                project: Some(instance.project_id(c)),
                cost,
                remaining,
            },
            other => other,
        })?;

        let mut payments_this_step: BTreeMap<usize, Money> = BTreeMap::new();
        for &(v, contribution) in &contributions {
            voter_budget[v] -= contribution;
            *payments[c].entry(v).or_insert(Money::ZERO) += contribution;
            payments_this_step.insert(v, contribution);
        }
        allocation[c] += increment;

        if allocation[c] >= instance.max_bid[c] {
            phase[c] = ProjectPhase::Retired;
            next_cost[c] = NextCost::None;
            working_bids[c].clear();
        } else {
            phase[c] = ProjectPhase::Continuous;
            next_cost[c] = NextCost::Continuous;
            working_bids[c] = working_bids[c]
                .iter()
                .filter_map(|&(v, bid)| {
                    let new_bid = bid.saturating_sub(increment);
                    if new_bid.is_positive() {
                        Some((v, new_bid))
                    } else {
                        None
                    }
                })
                .collect();
        }

        tracker.on_step(&StepSnapshot {
            project: instance.project_id(c),
            increment,
            effective_vote_counts: round_evc
                .iter()
                .map(|(&p, evc)| (instance.project_id(p), evc.as_f64()))
                .collect(),
            voter_budgets: (0..n_voters)
                .map(|v| (instance.voter_id(v), voter_budget[v]))
                .collect(),
            payments_this_step: payments_this_step
                .into_iter()
                .map(|(v, m)| (instance.voter_id(v), m))
                .collect(),
        });
    }

    Ok(FbrOutput {
        allocation,
        next_cost,
        payments,
    })
}
