use std::path::PathBuf;

use thiserror::Error;

/// # Description
/// the failures that stop a command and are reported to the user.
/// a malformed or missing stat inside a stats file is ***NOT*** an error,
/// that data point is just left out of the aggregation
#[derive(Debug, Error)]
pub enum LabError {
    #[error("simulator binary not found: {0} (set `simulator` in the config file or pass --simulator)")]
    MissingSimulator(PathBuf),
    #[error("simulator config script not found: {0} (set `config_script` in the config file or pass --script)")]
    MissingScript(PathBuf),
    #[error("kernel binary not found: {0} (build the kernel first, e.g. `cargo build --release`)")]
    MissingBinary(PathBuf),
    #[error("results directory not found: {0}")]
    MissingResultsDir(PathBuf),
    #[error("no simulation results found in {0}\n\nMake sure you have:\n1. run the sweep so that stats.txt files exist\n2. kept results in <results>/<kernel>/<config-label>/stats.txt\n3. used the correct results directory path")]
    NoResults(PathBuf),
    #[error("unknown kernel `{0}`, available kernels: {1}")]
    UnknownKernel(String, String),
    #[error("invalid cache size `{0}`, expected something like 16kB or 1MB")]
    InvalidSize(String),
    #[error("invalid config label `{0}`, expected something like 16kB_assoc2")]
    InvalidLabel(String),
    #[error("charting support is not available in this build (rebuild with `--features plot`); use `cache_lab analyze` for tabular output instead")]
    PlotUnavailable,
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("simulation for {label} failed: {reason}")]
    RunFailed { label: String, reason: String },
}
