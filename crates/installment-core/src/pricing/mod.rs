//! Installment plan pricing: the three interest conventions, single-tier
//! recomputation, and the ordered tier collection that owns a plan.

pub mod calculator;
pub mod edit;
pub mod plan;
pub mod rate_engine;
#[cfg(feature = "schedule")]
pub mod schedule;
pub mod tier;
pub mod tiers;
