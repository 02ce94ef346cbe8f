//! the statistic names the analysis understands.
//!
//! the dependent metrics are a fixed, documented set; each one lists the stats keys it is
//! read from, both gem5 naming generations (`overallMisses::total` and `overall_misses::total`).
//! anything else that looks like a dotted key is read verbatim.

use std::{fmt, str::FromStr};

use clap::ArgEnum;
use serde::Serialize;

use crate::{config_label::RunConfig, stats::StatsFile};

/// gem5 ticks are picoseconds
const SECONDS_PER_TICK: f64 = 1e-12;

/// the x axis: a cache parameter of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum, Serialize)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Independent {
    L1dSize,
    L1dAssoc,
    L1iSize,
    L2Size,
    Clock,
}

impl Independent {
    /// `None` when the run's directory or file name doesn't encode this parameter
    pub fn value(&self, config: &RunConfig) -> Option<u64> {
        match self {
            Independent::L1dSize => config.l1d_size_kb,
            Independent::L1dAssoc => config.l1d_assoc.map(u64::from),
            Independent::L1iSize => config.l1i_size_kb,
            Independent::L2Size => config.l2_size_kb,
            Independent::Clock => config.clock_mhz,
        }
    }

    /// cache sizes double from one configuration to the next
    pub fn is_size(&self) -> bool {
        matches!(
            self,
            Independent::L1dSize | Independent::L1iSize | Independent::L2Size
        )
    }

    /// how one value of this axis is shown in a table row
    pub fn format_value(&self, value: u64) -> String {
        match self {
            Independent::L1dSize | Independent::L1iSize | Independent::L2Size => {
                format!("{}kB", value)
            }
            Independent::L1dAssoc => value.to_string(),
            Independent::Clock => format!("{}MHz", value),
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Independent::L1dSize => "L1D Cache Size (kB)",
            Independent::L1dAssoc => "L1D Cache Associativity",
            Independent::L1iSize => "L1I Cache Size (kB)",
            Independent::L2Size => "L2 Cache Size (kB)",
            Independent::Clock => "CPU Clock (MHz)",
        }
    }
}

impl fmt::Display for Independent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Independent::L1dSize => write!(f, "l1d_size"),
            Independent::L1dAssoc => write!(f, "l1d_assoc"),
            Independent::L1iSize => write!(f, "l1i_size"),
            Independent::L2Size => write!(f, "l2_size"),
            Independent::Clock => write!(f, "clock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLevel {
    L1d,
    L1i,
    L2,
}

impl CacheLevel {
    fn prefix(&self) -> &'static str {
        match self {
            CacheLevel::L1d => "system.cpu.dcache",
            CacheLevel::L1i => "system.cpu.icache",
            CacheLevel::L2 => "system.l2cache",
        }
    }
}

/// the y axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Dependent {
    Ipc,
    Cpi,
    MissRate(CacheLevel),
    ExecutionTime,
    SimInsts,
    NumCycles,
    /// any stats key, read as is
    Raw(String),
}

pub const DEPENDENT_NAMES: &[&str] = &[
    "ipc",
    "cpi",
    "l1d_miss_rate",
    "l1i_miss_rate",
    "l2_miss_rate",
    "execution_time",
    "sim_insts",
    "num_cycles",
];

impl FromStr for Dependent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let metric = match s {
            "ipc" => Dependent::Ipc,
            "cpi" => Dependent::Cpi,
            "l1d_miss_rate" => Dependent::MissRate(CacheLevel::L1d),
            "l1i_miss_rate" => Dependent::MissRate(CacheLevel::L1i),
            "l2_miss_rate" => Dependent::MissRate(CacheLevel::L2),
            "execution_time" => Dependent::ExecutionTime,
            "sim_insts" => Dependent::SimInsts,
            "num_cycles" => Dependent::NumCycles,
            key if key.contains('.') || key.starts_with("sim") || key.starts_with("host") => {
                Dependent::Raw(key.to_string())
            }
            other => {
                return Err(format!(
                    "unknown metric `{}`, use one of {} or a stats key such as system.cpu.ipc",
                    other,
                    DEPENDENT_NAMES.join(", ")
                ))
            }
        };
        Ok(metric)
    }
}

impl fmt::Display for Dependent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependent::Ipc => write!(f, "ipc"),
            Dependent::Cpi => write!(f, "cpi"),
            Dependent::MissRate(CacheLevel::L1d) => write!(f, "l1d_miss_rate"),
            Dependent::MissRate(CacheLevel::L1i) => write!(f, "l1i_miss_rate"),
            Dependent::MissRate(CacheLevel::L2) => write!(f, "l2_miss_rate"),
            Dependent::ExecutionTime => write!(f, "execution_time"),
            Dependent::SimInsts => write!(f, "sim_insts"),
            Dependent::NumCycles => write!(f, "num_cycles"),
            Dependent::Raw(key) => write!(f, "{}", key),
        }
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

fn sim_insts(stats: &StatsFile) -> Option<f64> {
    stats.first_of(&["simInsts", "sim_insts"])
}

fn num_cycles(stats: &StatsFile) -> Option<f64> {
    stats.first_of(&["system.cpu.numCycles", "system.cpu.num_cycles"])
}

fn ipc(stats: &StatsFile) -> Option<f64> {
    stats
        .get("system.cpu.ipc")
        .or_else(|| ratio(sim_insts(stats), num_cycles(stats)))
}

fn miss_rate(stats: &StatsFile, level: CacheLevel) -> Option<f64> {
    let prefix = level.prefix();
    let key = |stat: &str| format!("{}.{}::total", prefix, stat);
    let get = |names: [&str; 2]| stats.first_of(&[key(names[0]).as_str(), key(names[1]).as_str()]);

    if let Some(rate) = get(["overallMissRate", "overall_miss_rate"]) {
        return Some(rate);
    }
    let misses = get(["overallMisses", "overall_misses"]);
    ratio(misses, get(["overallAccesses", "overall_accesses"])).or_else(|| {
        let hits = get(["overallHits", "overall_hits"]);
        match (hits, misses) {
            (Some(h), Some(m)) => ratio(Some(m), Some(h + m)),
            _ => None,
        }
    })
}

impl Dependent {
    /// # Description
    /// read this metric out of one stats file
    /// # Return
    /// `None` when the keys are absent or the value is not finite, the data point is then left out
    pub fn extract(&self, stats: &StatsFile) -> Option<f64> {
        let value = match self {
            Dependent::Ipc => ipc(stats),
            Dependent::Cpi => stats
                .get("system.cpu.cpi")
                .or_else(|| ipc(stats).filter(|ipc| *ipc > 0.0).map(|ipc| 1.0 / ipc)),
            Dependent::MissRate(level) => miss_rate(stats, *level),
            Dependent::ExecutionTime => stats
                .first_of(&["simSeconds", "sim_seconds"])
                .or_else(|| {
                    stats
                        .first_of(&["simTicks", "sim_ticks"])
                        .map(|ticks| ticks * SECONDS_PER_TICK)
                }),
            Dependent::SimInsts => sim_insts(stats),
            Dependent::NumCycles => num_cycles(stats),
            Dependent::Raw(key) => stats.get(key),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn axis_label(&self) -> String {
        match self {
            Dependent::Ipc => "Instructions Per Cycle (IPC)".to_string(),
            Dependent::Cpi => "Cycles Per Instruction (CPI)".to_string(),
            Dependent::MissRate(CacheLevel::L1d) => "L1D Cache Miss Rate".to_string(),
            Dependent::MissRate(CacheLevel::L1i) => "L1I Cache Miss Rate".to_string(),
            Dependent::MissRate(CacheLevel::L2) => "L2 Cache Miss Rate".to_string(),
            Dependent::ExecutionTime => "Execution Time (seconds)".to_string(),
            Dependent::SimInsts => "Simulated Instructions".to_string(),
            Dependent::NumCycles => "CPU Cycles".to_string(),
            Dependent::Raw(key) => key.clone(),
        }
    }
}
