// Reconciliation pipeline: normalize, filter, repair, merge, assemble

pub mod assemble;
pub mod audit;
pub mod filter;
pub mod merge;
pub mod normalize;
pub mod repair;

// Re-export the orchestration entry points
pub use assemble::{Assembler, WrangleOutcome};
