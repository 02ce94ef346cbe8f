use std::{cmp::Ordering, fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LabError;

lazy_static! {
    static ref SIZE_RE: Regex = Regex::new(r"^(\d+)\s*([kKmMgG]?)[bB]?$").expect("size pattern");
    static ref LABEL_RE: Regex = Regex::new(r"(\d+[kKmMgG][bB]?)_?assoc(\d+)").expect("label pattern");
    static ref L1I_RE: Regex = Regex::new(r"_L1I(\d+[kKmMgG][bB]?)(?:A(\d+))?").expect("l1i pattern");
    static ref L1D_RE: Regex = Regex::new(r"_L1D(\d+[kKmMgG][bB]?)(?:A(\d+))?").expect("l1d pattern");
    static ref L2_RE: Regex = Regex::new(r"_L2(\d+[kKmMgG][bB]?)(?:A(\d+))?").expect("l2 pattern");
    static ref CLOCK_RE: Regex =
        Regex::new(r"_(\d+(?:\.\d+)?)([GM])(?:[hH][zZ])?(?:_|\.txt$|$)").expect("clock pattern");
    static ref BINARY_RE: Regex = Regex::new(r"^stats_binary(.+?)_CPU").expect("binary pattern");
    static ref VARIANT_RE: Regex = Regex::new(r"^stats_([^_]+)_(opt|unopt)").expect("variant pattern");
}

/// # Description
/// parse a cache size string into kB
/// # Example
/// ```
/// use cache_lab::config_label::parse_size_kb;
/// assert_eq!(parse_size_kb("16kB").unwrap(), 16);
/// assert_eq!(parse_size_kb("1MB").unwrap(), 1024);
/// assert!(parse_size_kb("lots").is_err());
/// ```
pub fn parse_size_kb(size: &str) -> Result<u64, LabError> {
    let caps = SIZE_RE
        .captures(size.trim())
        .ok_or_else(|| LabError::InvalidSize(size.to_string()))?;
    let value: u64 = caps[1]
        .parse()
        .map_err(|_| LabError::InvalidSize(size.to_string()))?;
    let kb = match caps[2].to_ascii_lowercase().as_str() {
        "k" => Some(value),
        "m" => value.checked_mul(1024),
        "g" => value.checked_mul(1024 * 1024),
        // plain bytes, must be a whole number of kB
        _ if value % 1024 == 0 => Some(value / 1024),
        _ => None,
    };
    kb.ok_or_else(|| LabError::InvalidSize(size.to_string()))
}

/// one cache configuration, rendered as the results directory name `16kB_assoc2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigLabel {
    pub size_kb: u64,
    pub assoc: u32,
}

impl ConfigLabel {
    pub fn new(size_kb: u64, assoc: u32) -> Self {
        ConfigLabel { size_kb, assoc }
    }

    /// the size the way the simulator expects it on the command line
    pub fn size_arg(&self) -> String {
        format!("{}kB", self.size_kb)
    }

    /// find a label anywhere inside a directory name, `run_16kB_assoc2_v1` works too
    pub fn find_in(name: &str) -> Option<Self> {
        let caps = LABEL_RE.captures(name)?;
        let size_kb = parse_size_kb(&caps[1]).ok()?;
        let assoc = caps[2].parse().ok()?;
        Some(ConfigLabel { size_kb, assoc })
    }
}

impl fmt::Display for ConfigLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kB_assoc{}", self.size_kb, self.assoc)
    }
}

impl FromStr for ConfigLabel {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigLabel::find_in(s).ok_or_else(|| LabError::InvalidLabel(s.to_string()))
    }
}

impl Ord for ConfigLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size_kb
            .cmp(&other.size_kb)
            .then(self.assoc.cmp(&other.assoc))
    }
}

impl PartialOrd for ConfigLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// # Description
/// the cache parameters one run is known to have, each one optional.
/// a `<kernel>/16kB_assoc2/stats.txt` run only knows its L1D, a flat
/// `stats_binarystream_CPUTimingSimpleCPU_L1I16kB_L1D32kB_L2256kB_1GHz.txt`
/// file knows every cache size and the clock but no associativity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub l1d_size_kb: Option<u64>,
    pub l1d_assoc: Option<u32>,
    pub l1i_size_kb: Option<u64>,
    pub l1i_assoc: Option<u32>,
    pub l2_size_kb: Option<u64>,
    pub l2_assoc: Option<u32>,
    pub clock_mhz: Option<u64>,
}

impl From<ConfigLabel> for RunConfig {
    fn from(label: ConfigLabel) -> Self {
        RunConfig {
            l1d_size_kb: Some(label.size_kb),
            l1d_assoc: Some(label.assoc),
            ..Default::default()
        }
    }
}

fn cache_level(re: &Regex, name: &str) -> (Option<u64>, Option<u32>) {
    match re.captures(name) {
        Some(caps) => (
            parse_size_kb(&caps[1]).ok(),
            caps.get(2).and_then(|assoc| assoc.as_str().parse().ok()),
        ),
        None => (None, None),
    }
}

impl RunConfig {
    /// the config of a run directory named like `16kB_assoc2`
    pub fn from_dir_name(name: &str) -> Self {
        ConfigLabel::find_in(name)
            .map(RunConfig::from)
            .unwrap_or_default()
    }

    /// # Description
    /// the config encoded in a flat stats file name, `L1D32kB` or `L1D32kBA4` per cache level
    /// and the clock as `_1GHz` / `_500MHz` / `_2G_`. a value spelled `default` or `None` is unknown
    pub fn from_file_name(name: &str) -> Self {
        let (l1d_size_kb, l1d_assoc) = cache_level(&L1D_RE, name);
        let (l1i_size_kb, l1i_assoc) = cache_level(&L1I_RE, name);
        let (l2_size_kb, l2_assoc) = cache_level(&L2_RE, name);
        let clock_mhz = CLOCK_RE.captures(name).and_then(|caps| {
            let value: f64 = caps[1].parse().ok()?;
            let mhz = if &caps[2] == "G" { value * 1000.0 } else { value };
            Some(mhz.round() as u64)
        });
        RunConfig {
            l1d_size_kb,
            l1d_assoc,
            l1i_size_kb,
            l1i_assoc,
            l2_size_kb,
            l2_assoc,
            clock_mhz,
        }
    }

    /// the L1D label, when both its size and associativity are known
    pub fn label(&self) -> Option<ConfigLabel> {
        Some(ConfigLabel::new(self.l1d_size_kb?, self.l1d_assoc?))
    }

    pub fn is_empty(&self) -> bool {
        *self == RunConfig::default()
    }
}

/// # Description
/// the kernel a flat stats file belongs to:
/// `stats_binary<kernel>_CPU...` or `stats_<kernel>_<opt|unopt>_...`, the variant is kept
/// so optimized and unoptimized builds stay apart
pub fn kernel_from_file_name(name: &str) -> Option<String> {
    if let Some(caps) = BINARY_RE.captures(name) {
        return Some(caps[1].to_string());
    }
    VARIANT_RE
        .captures(name)
        .map(|caps| format!("{}_{}", &caps[1], &caps[2]))
}
