//! Compact, array-backed run representation (§9 Design Notes).
//!
//! The external API deals in opaque `u64` ids in maps; internally, C4/C5
//! operate on dense, zero-based indices so voter budgets and project state
//! can live in plain `Vec`s instead of hash maps. `Instance` is built once
//! per `compute()` call (by C6, after C1 has normalised the bid table) and
//! is immutable for the lifetime of that call — only the per-FBR working
//! state (`crate::round::FbrState`) mutates.

use std::collections::BTreeMap;

use crate::types::{MaxBidTable, Money, ProjectId, ProjectRange, RawBidTable, VoterId};

#[derive(Debug)]
pub struct Instance {
    voter_ids: Vec<VoterId>,
    voter_index: BTreeMap<VoterId, usize>,
    project_ids: Vec<ProjectId>,
    project_index: BTreeMap<ProjectId, usize>,

    pub min_cost: Vec<Money>,
    pub max_cost: Vec<Money>,
    pub max_bid: Vec<Money>,
    /// Per project index: `(voter index, bid amount)`, sorted by voter
    /// index for determinism; zero bids and unknown voters already removed
    /// by C1.
    pub bids: Vec<Vec<(usize, Money)>>,
}

impl Instance {
    pub fn build(
        voters: &[VoterId],
        project_ranges: &BTreeMap<ProjectId, ProjectRange>,
        normalized_bids: &RawBidTable,
        max_bid: &MaxBidTable,
    ) -> Instance {
        let voter_ids: Vec<VoterId> = voters.to_vec();
        let voter_index: BTreeMap<VoterId, usize> =
            voter_ids.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let project_ids: Vec<ProjectId> = project_ranges.keys().copied().collect();
        let project_index: BTreeMap<ProjectId, usize> =
            project_ids.iter().enumerate().map(|(i, &p)| (p, i)).collect();

        let min_cost = project_ids.iter().map(|p| project_ranges[p].min_cost).collect();
        let max_cost = project_ids.iter().map(|p| project_ranges[p].max_cost).collect();
        let max_bid_vec = project_ids
            .iter()
            .map(|p| max_bid.get(p).copied().unwrap_or(Money::ZERO))
            .collect();

        let bids = project_ids
            .iter()
            .map(|p| {
                let mut entries: Vec<(usize, Money)> = normalized_bids
                    .get(p)
                    .map(|supporters| {
                        supporters
                            .iter()
                            .map(|(voter, amount)| (voter_index[voter], *amount))
                            .collect()
                    })
                    .unwrap_or_default();
                entries.sort_by_key(|&(idx, _)| idx);
                entries
            })
            .collect();

        Instance {
            voter_ids,
            voter_index,
            project_ids,
            project_index,
            min_cost,
            max_cost,
            max_bid: max_bid_vec,
            bids,
        }
    }

    pub fn n_voters(&self) -> usize {
        self.voter_ids.len()
    }

    pub fn n_projects(&self) -> usize {
        self.project_ids.len()
    }

    pub fn voter_id(&self, idx: usize) -> VoterId {
        self.voter_ids[idx]
    }

    pub fn project_id(&self, idx: usize) -> ProjectId {
        self.project_ids[idx]
    }

    pub fn project_index(&self, id: ProjectId) -> Option<usize> {
        self.project_index.get(&id).copied()
    }

    pub fn voter_index(&self, id: VoterId) -> Option<usize> {
        self.voter_index.get(&id).copied()
    }

    pub fn project_ids(&self) -> &[ProjectId] {
        &self.project_ids
    }

    pub fn voter_ids(&self) -> &[VoterId] {
        &self.voter_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectRange;

    fn ranges(pairs: &[(ProjectId, i64, i64)]) -> BTreeMap<ProjectId, ProjectRange> {
        pairs
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
            .collect()
    }

    #[test]
    fn build_interns_ids_to_dense_indices() {
        let ranges = ranges(&[(11, 100, 200), (12, 50, 60)]);
        let bids: RawBidTable = [(11, [(1, Money::from_units(100))].into())].into();
        let max_bid: MaxBidTable = [(11, Money::from_units(100)), (12, Money::ZERO)].into();
        let instance = Instance::build(&[1, 2], &ranges, &bids, &max_bid);

        assert_eq!(instance.n_voters(), 2);
        assert_eq!(instance.n_projects(), 2);
        assert_eq!(instance.project_index(11), Some(0));
        assert_eq!(instance.project_index(12), Some(1));
        assert_eq!(instance.voter_index(1), Some(0));
        assert_eq!(instance.bids[0], vec![(0, Money::from_units(100))]);
        assert!(instance.bids[1].is_empty());
    }
}
