//! the crate cache_lab is a small lab kit for cache experiments on a cycle level simulator.
//! there are 4 parts in the crate:
//!
//! - kernels: deterministic benchmark programs with distinct memory access patterns.
//! - sweep: run the external simulator once per L1D size/associativity pair.
//! - stats: parse the simulator's `stats.txt`, see also results and metrics.
//! - analysis: group the runs by a cache parameter and aggregate a metric, plot draws the result.
//!
//!

pub mod analysis;
pub mod cmd_args;
pub mod config_label;
pub mod error;
pub mod kernels;
pub mod metrics;
pub mod plot;
pub mod results;
pub mod settings;
pub mod stats;
pub mod sweep;
