//! C2 — cost-sharing primitive (§4.2): sorted equal-split with cascading
//! fallback.
//!
//! Given a `cost` and a list of `(voter, budget)` pairs, walk the voters in
//! ascending-budget order. The first voter (and everyone after them, since
//! the list is sorted) who can afford an equal share of what's left pays
//! that share; everyone before them pays their entire budget and the
//! remaining cost shrinks accordingly.
//!
//! Because amounts are integer micro-units (`Money`), "afford an equal
//! share" is decided by the exact integer test `budget * denom >=
//! remaining`, equivalent to comparing against the real-valued share
//! without ever dividing first. Once a block of voters is found to share
//! the remainder, the floor-divided share goes to everyone in the block and
//! the `remaining % denom` leftover micro-units go one each to the first
//! voters in the block (ascending budget, ties broken by ascending voter
//! id) — so `Σ contribution = cost` exactly, not merely within the spec's
//! `≤ 1 unit` tolerance.

use crate::error::{EngineError, EngineResult};
use crate::types::{Money, VoterId};

pub fn distribute(cost: Money, pairs: &[(VoterId, Money)]) -> EngineResult<Vec<(VoterId, Money)>> {
    let mut sorted: Vec<(VoterId, Money)> = pairs.to_vec();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let n = sorted.len() as i64;
    let mut remaining = cost.micros();
    let mut contributions = Vec::with_capacity(sorted.len());
    let mut i = 0usize;

    while i < sorted.len() {
        let denom = n - i as i64;
        let (voter, budget) = sorted[i];
        let affordable = budget.micros().checked_mul(denom).map_or(true, |v| v >= remaining);

        if affordable {
            let share_floor = remaining / denom;
            let remainder = remaining % denom;
            for (k, &(v, _)) in sorted[i..].iter().enumerate() {
                let extra = if (k as i64) < remainder { 1 } else { 0 };
                contributions.push((v, Money::from_micros(share_floor + extra)));
            }
            remaining = 0;
            break;
        }

        contributions.push((voter, budget));
        remaining -= budget.micros();
        i += 1;
    }

    if remaining > 0 {
        return Err(EngineError::NotFullyFunded {
            project: None,
            cost,
            remaining: Money::from_micros(remaining),
        });
    }

    Ok(contributions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(v: VoterId, units: i64) -> (VoterId, Money) {
        (v, Money::from_units(units))
    }

    fn sum(contributions: &[(VoterId, Money)]) -> Money {
        contributions.iter().map(|(_, m)| *m).sum()
    }

    #[test]
    fn s6_cascading_fallback() {
        let pairs = [pair(1, 11), pair(2, 25), pair(3, 55)];
        let result = distribute(Money::from_units(66), &pairs).unwrap();
        let as_map: std::collections::BTreeMap<_, _> = result.into_iter().collect();
        assert_eq!(as_map[&1], Money::from_units(11));
        assert_eq!(as_map[&2], Money::from_units(25));
        assert_eq!(as_map[&3], Money::from_units(30));
    }

    #[test]
    fn s6_is_invariant_under_permutation() {
        let forward = [pair(1, 11), pair(2, 25), pair(3, 55)];
        let shuffled = [pair(2, 25), pair(3, 55), pair(1, 11)];
        let a: std::collections::BTreeMap<_, _> =
            distribute(Money::from_units(66), &forward).unwrap().into_iter().collect();
        let b: std::collections::BTreeMap<_, _> =
            distribute(Money::from_units(66), &shuffled).unwrap().into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn s7_insufficient_funds_fails() {
        let pairs = [pair(1, 11), pair(2, 12), pair(3, 13)];
        let err = distribute(Money::from_units(66), &pairs).unwrap_err();
        match err {
            EngineError::NotFullyFunded { remaining, .. } => {
                assert_eq!(remaining, Money::from_units(30));
            }
            other => panic!("expected NotFullyFunded, got {other:?}"),
        }
    }

    #[test]
    fn equal_budgets_split_evenly() {
        let pairs = [pair(1, 100), pair(2, 100), pair(3, 100)];
        let result = distribute(Money::from_units(150), &pairs).unwrap();
        assert_eq!(sum(&result), Money::from_units(150));
        for (_, contribution) in &result {
            assert!(*contribution <= Money::from_units(100));
        }
    }

    #[test]
    fn three_way_equal_split_is_exact_to_the_micro() {
        // 500 / 3 = 166.666666... — the remainder must be absorbed, not dropped.
        let pairs = [pair(1, 500), pair(2, 500), pair(3, 500)];
        let result = distribute(Money::from_units(500), &pairs).unwrap();
        assert_eq!(sum(&result), Money::from_units(500));
    }

    #[test]
    fn zero_cost_yields_zero_contributions() {
        let pairs = [pair(1, 10), pair(2, 10)];
        let result = distribute(Money::ZERO, &pairs).unwrap();
        assert!(result.iter().all(|(_, m)| m.is_zero()));
    }

    #[test]
    fn single_voter_pays_whole_cost_if_affordable() {
        let pairs = [pair(1, 200)];
        let result = distribute(Money::from_units(150), &pairs).unwrap();
        assert_eq!(result[0].1, Money::from_units(150));
    }
}
