pub mod assess;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod pipeline;

// Domain data shapes shared across stages
pub mod domain;

pub use error::{Result, WrangleError};
