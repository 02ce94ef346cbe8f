//! grouping of data points and the count/average/min/max aggregation,
//! plus the fixed width text rendering of the result.

use std::collections::BTreeMap;
use std::fmt::Write;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::{
    metrics::{Dependent, Independent},
    results::RunResult,
};

/// count/average/min/max of one group of samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub count: usize,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Aggregate {
    /// # Example
    /// ```
    /// use cache_lab::analysis::Aggregate;
    /// let agg = Aggregate::from_samples(&[1.0, 3.0, 2.0]);
    /// assert_eq!(agg.count, 3);
    /// assert_eq!(agg.average(), Some(2.0));
    /// assert_eq!(agg.min, Some(1.0));
    /// assert_eq!(agg.max, Some(3.0));
    ///
    /// let empty = Aggregate::from_samples(&[]);
    /// assert_eq!(empty.count, 0);
    /// assert_eq!(empty.average(), None);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Self {
        let (min, max) = match samples
            .iter()
            .copied()
            .minmax_by(|a, b| a.total_cmp(b))
        {
            MinMaxResult::NoElements => (None, None),
            MinMaxResult::OneElement(v) => (Some(v), Some(v)),
            MinMaxResult::MinMax(min, max) => (Some(min), Some(max)),
        };
        Aggregate {
            count: samples.len(),
            sum: samples.iter().sum(),
            min,
            max,
        }
    }

    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// one row of the table: all samples of one kernel sharing one x value
#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub x: u64,
    pub samples: Vec<f64>,
    pub aggregate: Aggregate,
}

/// # Description
/// the aggregated view of a results directory
/// * `groups`: kernel -> rows sorted by ascending x
/// * `excluded`: data points dropped because the x parameter or the metric was missing
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub independent: Independent,
    pub dependent: Dependent,
    pub total_results: usize,
    pub excluded: usize,
    pub groups: BTreeMap<String, Vec<GroupRow>>,
}

impl Analysis {
    pub fn new(results: &[RunResult], independent: Independent, dependent: Dependent) -> Self {
        let mut excluded = 0;
        let mut grouped: BTreeMap<String, BTreeMap<u64, Vec<f64>>> = BTreeMap::new();
        for result in results {
            let x = independent.value(&result.config);
            let y = dependent.extract(&result.stats);
            match (x, y) {
                (Some(x), Some(y)) => grouped
                    .entry(result.kernel.clone())
                    .or_default()
                    .entry(x)
                    .or_default()
                    .push(y),
                _ => {
                    log::debug!("excluding {} from the analysis", result.path.display());
                    excluded += 1;
                }
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(kernel, rows)| {
                let rows = rows
                    .into_iter()
                    .map(|(x, samples)| GroupRow {
                        x,
                        aggregate: Aggregate::from_samples(&samples),
                        samples,
                    })
                    .collect();
                (kernel, rows)
            })
            .collect();

        Analysis {
            independent,
            dependent,
            total_results: results.len(),
            excluded,
            groups,
        }
    }

    pub fn num_configurations(&self) -> usize {
        self.groups.values().map(|rows| rows.len()).sum()
    }

    /// the per kernel tables followed by the totals footer
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(70);
        let dash = "-".repeat(62);
        // writing to a String can't fail
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(
            out,
            "Performance Analysis: {} vs {}",
            self.dependent, self.independent
        );
        let _ = writeln!(out, "{}", rule);

        for (kernel, rows) in &self.groups {
            let _ = writeln!(out, "\n{} RESULTS:", kernel.to_uppercase());
            let _ = writeln!(out, "{}", dash);
            let _ = writeln!(
                out,
                "{:<12} {:<12} {:<12} {:<12} {:<6}",
                "Config", "Average", "Min", "Max", "Count"
            );
            let _ = writeln!(out, "{}", dash);
            for row in rows {
                let agg = &row.aggregate;
                let _ = writeln!(
                    out,
                    "{:<12} {:<12} {:<12} {:<12} {:<6}",
                    self.independent.format_value(row.x),
                    format_value(agg.average()),
                    format_value(agg.min),
                    format_value(agg.max),
                    agg.count
                );
            }
        }

        let _ = writeln!(out, "\nSUMMARY:");
        let _ = writeln!(out, "{}", dash);
        let _ = writeln!(out, "Total results: {}", self.total_results);
        let _ = writeln!(out, "Excluded data points: {}", self.excluded);
        let _ = writeln!(out, "Applications: {}", self.groups.len());
        let _ = writeln!(out, "Total configurations: {}", self.num_configurations());
        out
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        // tiny miss rates and execution times would print as 0.0000
        Some(v) if v != 0.0 && v.abs() < 1e-3 => format!("{:.4e}", v),
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

/// # Description
/// the `--summary` report: per kernel IPC range, improvement and best/worst cache size.
/// uses IPC regardless of the dependent metric of the table
pub fn render_summary(results: &[RunResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=".repeat(70));
    let _ = writeln!(out, "ANALYSIS SUMMARY");
    let _ = writeln!(out, "{}", "=".repeat(70));

    let by_kernel = results
        .iter()
        .map(|r| (r.kernel.as_str(), r))
        .into_group_map();
    for kernel in by_kernel.keys().sorted() {
        let runs = &by_kernel[kernel];
        let _ = writeln!(out, "\n{}:", kernel.to_uppercase());
        if runs.len() < 2 {
            let _ = writeln!(out, "  Not enough data points for analysis");
            continue;
        }

        let ipcs: Vec<(Option<u64>, f64)> = runs
            .iter()
            .filter_map(|r| {
                Dependent::Ipc
                    .extract(&r.stats)
                    .map(|ipc| (r.config.l1d_size_kb, ipc))
            })
            .collect();
        if let MinMaxResult::MinMax(min, max) =
            ipcs.iter().map(|(_, ipc)| *ipc).minmax_by(|a, b| a.total_cmp(b))
        {
            let _ = writeln!(out, "  IPC range: {:.4} to {:.4}", min, max);
            if min > 0.0 {
                let _ = writeln!(out, "  Max improvement: {:.1}%", (max - min) / min * 100.0);
            }
        }

        let by_size: BTreeMap<u64, Vec<f64>> = ipcs
            .iter()
            .filter_map(|(size, ipc)| size.map(|s| (s, *ipc)))
            .filter(|(_, ipc)| *ipc > 0.0)
            .into_group_map()
            .into_iter()
            .collect();
        if by_size.len() > 1 {
            let sizes = by_size.keys().map(|s| format!("{}kB", s)).join(", ");
            let _ = writeln!(out, "  Cache sizes tested: {}", sizes);
            let averages: Vec<(u64, f64)> = by_size
                .iter()
                .filter_map(|(size, ipcs)| {
                    Aggregate::from_samples(ipcs).average().map(|avg| (*size, avg))
                })
                .collect();
            let best = averages.iter().max_by(|a, b| a.1.total_cmp(&b.1));
            let worst = averages.iter().min_by(|a, b| a.1.total_cmp(&b.1));
            if let (Some(best), Some(worst)) = (best, worst) {
                let _ = writeln!(out, "  Best cache size: {}kB (IPC: {:.4})", best.0, best.1);
                let _ = writeln!(out, "  Worst cache size: {}kB (IPC: {:.4})", worst.0, worst.1);
            }
        }
    }
    out
}
