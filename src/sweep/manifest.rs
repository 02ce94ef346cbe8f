use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use super::RunRecord;

/// the record of one sweep, written next to the results it produced
#[derive(Debug, Serialize)]
pub struct SweepManifest<'a> {
    pub started: String,
    pub finished: String,
    pub kernel: &'a str,
    pub kernel_binary: &'a Path,
    pub simulator: &'a Path,
    pub runs: &'a [RunRecord],
}

pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d-%H-%M-%S%.6f").to_string()
}

impl SweepManifest<'_> {
    /// write the manifest as `<results_dir>/sweep-<finished>.json`
    pub fn write(&self, results_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
        std::fs::create_dir_all(results_dir)?;
        let output_path = results_dir.join(format!("sweep-{}.json", self.finished));
        std::fs::write(&output_path, serde_json::to_string_pretty(self)?)?;
        Ok(output_path)
    }
}
