use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};

use crate::{
    config_label::{kernel_from_file_name, RunConfig},
    error::LabError,
    stats::StatsFile,
};

/// the file name the simulator writes into each run directory
pub const STATS_FILE_NAME: &str = "stats.txt";

/// flat stats files that carry their configuration in the name
pub const FLAT_STATS_PATTERN: &str = "stats_*.txt";

/// # Description
/// one data point: the stats of one simulator run
/// * `kernel`: the directory above the label, or the kernel in a flat file name, `unknown` otherwise
/// * `config`: whatever the run directory name or the flat file name encodes
/// * `path`: the stats file
#[derive(Debug, Clone)]
pub struct RunResult {
    pub kernel: String,
    pub config: RunConfig,
    pub path: PathBuf,
    pub stats: StatsFile,
}

/// drop the `.` components, glob leaves them out of what it returns
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// the kernel of `<results>/.../<kernel>/<label>`, `None` when the run directory sits
/// right inside `results_dir`
fn kernel_from_layout(results_dir: &Path, run_dir: &Path) -> Option<String> {
    let run_dir = normalize(run_dir);
    let relative = run_dir.strip_prefix(normalize(results_dir)).ok()?;
    relative
        .parent()
        .and_then(|parent| parent.file_name())
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

impl RunResult {
    /// # Description
    /// build the data point for `stats_path`, either
    /// `<results>/<kernel>/<label>/stats.txt` or `<results>/.../stats_<config>.txt`
    pub fn from_stats_path(results_dir: &Path, stats_path: &Path) -> Result<Self, Box<dyn Error>> {
        let stats = StatsFile::from_path(stats_path)?;
        let run_dir = stats_path.parent().unwrap_or(results_dir);
        let file_name = stats_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        let (kernel, config) = if file_name == STATS_FILE_NAME {
            let config = run_dir
                .file_name()
                .and_then(|name| name.to_str())
                .map(RunConfig::from_dir_name)
                .unwrap_or_default();
            (kernel_from_layout(results_dir, run_dir), config)
        } else {
            (
                kernel_from_file_name(file_name),
                RunConfig::from_file_name(file_name),
            )
        };
        Ok(RunResult {
            kernel: kernel.unwrap_or_else(|| "unknown".to_string()),
            config,
            path: stats_path.to_path_buf(),
            stats,
        })
    }
}

/// # Description
/// find every `stats.txt` and `stats_*.txt` below `results_dir` and parse it
/// # Return
/// * `Err(MissingResultsDir)` when the directory does not exist
/// * the data points sorted by path, unreadable or empty stats files are skipped with a warning
pub fn collect_results(results_dir: &Path) -> Result<Vec<RunResult>, Box<dyn Error>> {
    if !results_dir.is_dir() {
        return Err(LabError::MissingResultsDir(results_dir.to_path_buf()).into());
    }
    let mut root = normalize(results_dir);
    if root.as_os_str().is_empty() {
        root = PathBuf::from(".");
    }
    let root = glob::Pattern::escape(&root.to_string_lossy());

    let mut results = Vec::new();
    for file_pattern in [STATS_FILE_NAME, FLAT_STATS_PATTERN] {
        let pattern = format!("{}/**/{}", root, file_pattern);
        debug!("searching results with pattern {}", pattern);
        for entry in glob::glob(&pattern)? {
            let stats_path = entry?;
            match RunResult::from_stats_path(results_dir, &stats_path) {
                Ok(result) if result.stats.is_empty() => {
                    warn!("no stats in {}, skipping", stats_path.display())
                }
                Ok(result) => results.push(result),
                Err(e) => warn!("failed to read {}: {}", stats_path.display(), e),
            }
        }
    }
    results.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(results)
}

/// the union of all stat keys over `results`
pub fn all_keys(results: &[RunResult]) -> BTreeSet<String> {
    results
        .iter()
        .flat_map(|r| r.stats.keys().map(|k| k.to_string()))
        .collect()
}
