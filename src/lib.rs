//! Deterministic Method-of-Equal-Shares participatory budgeting engine.
//!
//! The pipeline is a straight line: normalise the bid table (§4.1), build a
//! dense run representation (§9), drive the budget-escalation outer loop
//! (§4.5) which itself repeatedly runs a fixed-budget round (§4.4) built on
//! a cost-sharing primitive (§4.2) and a tie-breaking rule (§4.3). The
//! public surface is [`facade::compute`]; everything else is an
//! implementation detail a caller embedding this crate normally doesn't
//! need to reach for directly.

pub mod config;
pub mod distribute;
pub mod error;
pub mod facade;
pub mod instance;
pub mod normalize;
pub mod outer_loop;
pub mod round;
pub mod scenario;
pub mod tie_break;
pub mod tracker;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use facade::{compute, compute_with_tracker, Allocation, Payments, RunStats};
pub use types::{Money, ProjectId, ProjectRange, VoterId};
