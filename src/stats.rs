use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

/// # Description
/// the numeric content of one simulator stats file
///
/// the file is line oriented, each stat line looks like
/// ```text
/// system.cpu.ipc                               0.226400    # IPC: instructions per cycle
/// ```
/// blank lines, lines starting with `#` and lines that don't carry a numeric
/// value (the `---------- Begin Simulation Statistics ----------` banners) are skipped.
/// when the simulator dumped more than one block the last value wins
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatsFile {
    entries: BTreeMap<String, f64>,
}

impl StatsFile {
    /// read and parse the stats file at `path`, only io failures are errors
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let stats = Self::parse(&contents);
        debug!(
            "parsed {} stats from {}",
            stats.len(),
            path.as_ref().display()
        );
        Ok(stats)
    }

    /// # Example
    /// ```
    /// use cache_lab::stats::StatsFile;
    /// let stats = StatsFile::parse("simInsts 1000 # insts\n# comment\n\nsystem.cpu.ipc 0.25\n");
    /// assert_eq!(stats.get("simInsts"), Some(1000.0));
    /// assert_eq!(stats.get("system.cpu.ipc"), Some(0.25));
    /// assert_eq!(stats.len(), 2);
    /// ```
    pub fn parse(contents: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (key, value) = match (fields.next(), fields.next()) {
                (Some(key), Some(value)) => (key, value),
                _ => continue,
            };
            match value.parse::<f64>() {
                Ok(value) => {
                    entries.insert(key.to_string(), value);
                }
                Err(_) => debug!("skipping non numeric stat line: {}", line),
            }
        }
        StatsFile { entries }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(key).copied()
    }

    /// the first key of `keys` present in the file
    pub fn first_of(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
