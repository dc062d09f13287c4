//! C1 — input normaliser (§4.1).
//!
//! Three total transforms over the raw, externally-shaped bid table:
//! drop zero bids, drop bids from voters the caller didn't declare, and
//! compute each project's maximum bid. None of these can fail — malformed
//! input (negative amounts, bids for unknown projects) is a precondition
//! violation caught by the facade (C6), not by this module.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{MaxBidTable, Money, ProjectId, RawBidTable, VoterId};

/// Remove every `(project, voter) -> 0` pair. Projects keep an entry (an
/// empty map, if need be) so later stages can still report zero allocation
/// for a project with no positive bids.
pub fn drop_zero_bids(bids: &RawBidTable) -> RawBidTable {
    bids.iter()
        .map(|(project, supporters)| {
            let filtered: BTreeMap<VoterId, Money> = supporters
                .iter()
                .filter(|(_, amount)| amount.is_positive())
                .map(|(voter, amount)| (*voter, *amount))
                .collect();
            (*project, filtered)
        })
        .collect()
}

/// For every project, retain only `(voter -> amount)` pairs whose voter is
/// in the declared voter list.
pub fn drop_unknown_voters(bids: &RawBidTable, voters: &[VoterId]) -> RawBidTable {
    let known: BTreeSet<VoterId> = voters.iter().copied().collect();
    bids.iter()
        .map(|(project, supporters)| {
            let filtered: BTreeMap<VoterId, Money> = supporters
                .iter()
                .filter(|(voter, _)| known.contains(voter))
                .map(|(voter, amount)| (*voter, *amount))
                .collect();
            (*project, filtered)
        })
        .collect()
}

/// `MaxBid[p] = max_v bid(p, v)`; `0` for a project with no positive bids.
pub fn compute_max_bid(bids: &RawBidTable, project_ids: &[ProjectId]) -> MaxBidTable {
    project_ids
        .iter()
        .map(|&project| {
            let max = bids
                .get(&project)
                .and_then(|supporters| supporters.values().copied().max())
                .unwrap_or(Money::ZERO);
            (project, max)
        })
        .collect()
}

/// Run all three C1 transforms in the order the spec prescribes, and make
/// sure every declared project has an entry in the resulting bid table
/// (possibly empty) even if the caller never mentioned it in `bids`.
pub fn normalize(
    voters: &[VoterId],
    project_ids: &[ProjectId],
    bids: &RawBidTable,
) -> (RawBidTable, MaxBidTable) {
    let mut complete: RawBidTable = project_ids
        .iter()
        .map(|&p| (p, BTreeMap::new()))
        .collect();
    for (project, supporters) in bids {
        complete.entry(*project).or_default().extend(supporters.iter().map(|(v, a)| (*v, *a)));
    }

    let without_zero = drop_zero_bids(&complete);
    let without_unknown = drop_unknown_voters(&without_zero, voters);
    let max_bid = compute_max_bid(&without_unknown, project_ids);
    (without_unknown, max_bid)
}
