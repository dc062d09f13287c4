//! C3 — tie-breaker (§4.3).
//!
//! Reduces a set of projects tied on effective vote count to a single
//! winner via the lexicographic order `(currentCost ↑, supporterCount ↓,
//! project_id ↑)`. `project_id` ascending is itself a total order over any
//! non-empty candidate set, so the third step always leaves exactly one
//! project — [`EngineError::TieUnresolved`] is a safety net for a future
//! change to this function, not an expected path.

use crate::error::{EngineError, EngineResult};
use crate::types::{Money, ProjectId};

pub fn break_tie(
    candidates: &[ProjectId],
    current_cost: impl Fn(ProjectId) -> Money,
    supporter_count: impl Fn(ProjectId) -> usize,
) -> EngineResult<ProjectId> {
    if candidates.is_empty() {
        return Err(EngineError::TieUnresolved {
            candidates: Vec::new(),
        });
    }

    let mut remaining: Vec<ProjectId> = candidates.to_vec();

    let best_cost = remaining.iter().map(|&c| current_cost(c)).min().unwrap();
    remaining.retain(|&c| current_cost(c) == best_cost);

    let best_count = remaining.iter().map(|&c| supporter_count(c)).max().unwrap();
    remaining.retain(|&c| supporter_count(c) == best_count);

    let winner = *remaining.iter().min().unwrap();
    remaining.retain(|&c| c == winner);

    if remaining.len() == 1 {
        Ok(winner)
    } else {
        Err(EngineError::TieUnresolved { candidates: remaining })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn s1_ties_resolve_by_project_id() {
        // project 11 costs 99, project 12 costs 98 — not actually tied on
        // cost, but exercise the id tiebreak when costs coincide.
        let cost: HashMap<ProjectId, Money> =
            [(11, Money::from_units(99)), (12, Money::from_units(99))].into();
        let supporters: HashMap<ProjectId, usize> = [(11, 1), (12, 1)].into();
        let winner = break_tie(&[11, 12], |p| cost[&p], |p| supporters[&p]).unwrap();
        assert_eq!(winner, 11);
    }

    #[test]
    fn smallest_cost_wins_first() {
        let cost: HashMap<ProjectId, Money> =
            [(11, Money::from_units(99)), (12, Money::from_units(98))].into();
        let supporters: HashMap<ProjectId, usize> = [(11, 5), (12, 1)].into();
        let winner = break_tie(&[11, 12], |p| cost[&p], |p| supporters[&p]).unwrap();
        assert_eq!(winner, 12);
    }

    #[test]
    fn supporter_count_breaks_cost_ties() {
        let cost: HashMap<ProjectId, Money> =
            [(11, Money::from_units(100)), (12, Money::from_units(100))].into();
        let supporters: HashMap<ProjectId, usize> = [(11, 2), (12, 5)].into();
        let winner = break_tie(&[11, 12], |p| cost[&p], |p| supporters[&p]).unwrap();
        assert_eq!(winner, 12);
    }

    #[test]
    fn single_candidate_is_trivially_the_winner() {
        let winner = break_tie(&[42], |_| Money::ZERO, |_| 1).unwrap();
        assert_eq!(winner, 42);
    }
}
