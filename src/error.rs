//! Typed failures for the allocation engine (§7 of the spec).
//!
//! `InvalidInput` is an expected, caller-facing outcome. `NotFullyFunded`
//! and `TieUnresolved` are not expected in practice — both indicate an
//! internal inconsistency (C4 is supposed to pre-check affordability
//! before calling C2; C3's lexicographic order is supposed to be total
//! over project ids) and should be treated as fatal bugs by callers.

use crate::types::{Money, ProjectId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "cost-sharing primitive could not fully fund cost={cost} (remaining={remaining}) for project {project:?}"
    )]
    NotFullyFunded {
        project: Option<ProjectId>,
        cost: Money,
        remaining: Money,
    },

    #[error("tie-breaking left {candidates:?} unresolved")]
    TieUnresolved { candidates: Vec<ProjectId> },
}

pub type EngineResult<T> = Result<T, EngineError>;
