//! # Description
//! - the sweep driver: one simulator run per cache configuration, one at a time
//! - the configurations are the cross product of the L1D sizes and associativities
//! - a failed run is logged and skipped unless `fail_fast` is set
//!
//! # Components
//! - launcher: the `Launcher` trait and the blocking subprocess implementation
//! - manifest: the json record written after a sweep

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use enum_as_inner::EnumAsInner;
use itertools::iproduct;
use log::{info, warn};
use serde::Serialize;

use crate::{
    config_label::{parse_size_kb, ConfigLabel},
    error::LabError,
    settings::{Settings, SimulatorSettings, SweepSettings},
};

mod launcher;
mod manifest;

pub use launcher::{ExitReport, Invocation, Launcher, ProcessLauncher};
pub use manifest::{timestamp as manifest_timestamp, SweepManifest};

/// # Description
/// everything needed to format the invocations of one sweep
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub kernel: String,
    pub kernel_binary: PathBuf,
    pub results_dir: PathBuf,
    pub labels: Vec<ConfigLabel>,
    pub simulator: SimulatorSettings,
    pub fixed: SweepSettings,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOptions {
    pub dry_run: bool,
    pub fail_fast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, EnumAsInner)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// dry run, nothing was started
    Planned(String),
    /// the simulator exited with 0, holds the output directory
    Completed(PathBuf),
    /// non-zero exit or the simulator could not be started
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub label: String,
    pub command: String,
    pub outcome: RunOutcome,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub runs: Vec<RunRecord>,
}

impl SweepReport {
    pub fn completed(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| r.outcome.as_completed().is_some())
            .count()
    }

    pub fn failed(&self) -> Vec<&RunRecord> {
        self.runs
            .iter()
            .filter(|r| r.outcome.as_failed().is_some())
            .collect()
    }
}

/// the kernel name of a binary: its file name without extension
pub fn kernel_name(kernel_binary: &Path) -> String {
    kernel_binary
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "kernel".to_string())
}

/// look `program` up the way a shell does, bare names go through `PATH`
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

impl SweepPlan {
    /// # Arguments
    /// * `settings` - simulator, results directory and fixed cache parameters
    /// * `kernel_binary` - the program the simulator runs
    /// * `kernel` - the results sub directory, defaults to the binary's file stem
    /// * `sizes` / `assocs` - override the swept values of the settings when not empty
    pub fn new(
        settings: &Settings,
        kernel_binary: PathBuf,
        kernel: Option<String>,
        sizes: &[String],
        assocs: &[u32],
    ) -> Result<Self, LabError> {
        let sweep = &settings.sweep_settings;
        let sizes = if sizes.is_empty() {
            sweep.l1d_sizes.as_slice()
        } else {
            sizes
        };
        let assocs = if assocs.is_empty() {
            sweep.l1d_assocs.as_slice()
        } else {
            assocs
        };
        let sizes_kb = sizes
            .iter()
            .map(|s| parse_size_kb(s))
            .collect::<Result<Vec<_>, _>>()?;
        let labels = iproduct!(sizes_kb, assocs.iter().copied())
            .map(|(size_kb, assoc)| ConfigLabel::new(size_kb, assoc))
            .collect();

        Ok(SweepPlan {
            kernel: kernel.unwrap_or_else(|| kernel_name(&kernel_binary)),
            kernel_binary,
            results_dir: PathBuf::from(&settings.results_dir),
            labels,
            simulator: settings.simulator_settings.clone(),
            fixed: sweep.clone(),
        })
    }

    /// `<results>/<kernel>/<label>`
    pub fn out_dir(&self, label: &ConfigLabel) -> PathBuf {
        self.results_dir.join(&self.kernel).join(label.to_string())
    }

    pub fn invocation(&self, label: &ConfigLabel) -> Invocation {
        let mut args = Vec::new();
        if !self.simulator.outdir_flag.is_empty() {
            args.push(format!(
                "{}={}",
                self.simulator.outdir_flag,
                self.out_dir(label).display()
            ));
        }
        args.push(self.simulator.config_script.clone());
        args.push(format!("--binary={}", self.kernel_binary.display()));
        args.push(format!("--l1d_size={}", label.size_arg()));
        args.push(format!("--l1d_assoc={}", label.assoc));
        args.push(format!("--l1i_size={}", self.fixed.l1i_size));
        args.push(format!("--l1i_assoc={}", self.fixed.l1i_assoc));
        args.push(format!("--l2_size={}", self.fixed.l2_size));
        args.push(format!("--l2_assoc={}", self.fixed.l2_assoc));
        args.extend(self.simulator.extra_args.iter().cloned());
        Invocation {
            program: PathBuf::from(&self.simulator.simulator),
            args,
        }
    }

    /// # Description
    /// fail before the first run if something the sweep needs is missing.
    /// a dry run only needs the kernel binary
    pub fn validate(&self, dry_run: bool) -> Result<(), LabError> {
        if !self.kernel_binary.is_file() {
            return Err(LabError::MissingBinary(self.kernel_binary.clone()));
        }
        if dry_run {
            return Ok(());
        }
        let simulator = Path::new(&self.simulator.simulator);
        if resolve_program(simulator).is_none() {
            return Err(LabError::MissingSimulator(simulator.to_path_buf()));
        }
        let script = Path::new(&self.simulator.config_script);
        if !script.is_file() {
            return Err(LabError::MissingScript(script.to_path_buf()));
        }
        Ok(())
    }
}

/// # Description
/// run every configuration of `plan` in order
/// # Arguments
/// * `launcher` - starts the simulator, never called on a dry run
/// * `out` - where the dry run commands and the per run lines are printed
/// # Return
/// the outcome of every run, or the first failure when `fail_fast` is set
pub fn run_sweep<L: Launcher, W: Write>(
    plan: &SweepPlan,
    options: SweepOptions,
    launcher: &mut L,
    out: &mut W,
) -> Result<SweepReport, Box<dyn Error>> {
    plan.validate(options.dry_run)?;
    let total = plan.labels.len();
    info!(
        "sweeping {} over {} configurations{}",
        plan.kernel,
        total,
        if options.dry_run { " (dry run)" } else { "" }
    );

    let mut report = SweepReport::default();
    for (i, label) in plan.labels.iter().enumerate() {
        let invocation = plan.invocation(label);
        let command = invocation.command_line();
        let outcome = if options.dry_run {
            writeln!(out, "[dry-run] {}", command)?;
            RunOutcome::Planned(plan.out_dir(label).display().to_string())
        } else {
            writeln!(out, "[{}/{}] {}", i + 1, total, label)?;
            let out_dir = plan.out_dir(label);
            match std::fs::create_dir_all(&out_dir) {
                Err(e) => RunOutcome::Failed(format!(
                    "failed to create {}: {}",
                    out_dir.display(),
                    e
                )),
                Ok(()) => match launcher.launch(&invocation) {
                    Ok(ExitReport { success: true, .. }) => RunOutcome::Completed(out_dir),
                    Ok(ExitReport { code, .. }) => RunOutcome::Failed(match code {
                        Some(code) => format!("exit code {}", code),
                        None => "terminated by signal".to_string(),
                    }),
                    Err(e) => RunOutcome::Failed(format!("failed to start simulator: {}", e)),
                },
            }
        };

        if let Some(reason) = outcome.as_failed() {
            if options.fail_fast {
                return Err(LabError::RunFailed {
                    label: label.to_string(),
                    reason: reason.clone(),
                }
                .into());
            }
            warn!("{} failed ({}), skipping", label, reason);
        }
        report.runs.push(RunRecord {
            label: label.to_string(),
            command,
            outcome,
        });
    }

    if !options.dry_run {
        info!(
            "sweep finished: {} completed, {} failed",
            report.completed(),
            report.failed().len()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;

    /// records every invocation, fails the labels it is told to
    struct RecordingLauncher {
        calls: Vec<Invocation>,
        fail_on: Vec<String>,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&mut self, invocation: &Invocation) -> std::io::Result<ExitReport> {
            self.calls.push(invocation.clone());
            let failing = self
                .fail_on
                .iter()
                .any(|label| invocation.args[0].ends_with(&format!("/{}", label)));
            Ok(ExitReport {
                success: !failing,
                code: Some(if failing { 1 } else { 0 }),
            })
        }
    }

    fn plan_in(dir: &Path) -> SweepPlan {
        let binary = dir.join("matrix_mult");
        std::fs::write(&binary, b"").unwrap();
        let simulator = dir.join("gem5.opt");
        std::fs::write(&simulator, b"").unwrap();
        let script = dir.join("cache_experiment.py");
        std::fs::write(&script, b"").unwrap();

        let mut settings = Settings::new(vec![]).unwrap();
        settings.results_dir = dir.join("results").to_string_lossy().to_string();
        settings.simulator_settings.simulator = simulator.to_string_lossy().to_string();
        settings.simulator_settings.config_script = script.to_string_lossy().to_string();
        SweepPlan::new(
            &settings,
            binary,
            None,
            &["8kB".to_string(), "16kB".to_string()],
            &[1, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_cross_product() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_in(dir.path());
        assert_eq!(plan.kernel, "matrix_mult");
        let labels: Vec<String> = plan.labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            labels,
            vec!["8kB_assoc1", "8kB_assoc2", "16kB_assoc1", "16kB_assoc2"]
        );

        let invocation = plan.invocation(&plan.labels[3]);
        assert!(invocation.args[0].starts_with("--outdir="));
        assert!(invocation.args[0].ends_with("matrix_mult/16kB_assoc2"));
        assert!(invocation.args.contains(&"--l1d_size=16kB".to_string()));
        assert!(invocation.args.contains(&"--l1d_assoc=2".to_string()));
        assert!(invocation.args.contains(&"--l2_size=256kB".to_string()));
    }

    #[test]
    fn test_dry_run_prints_everything() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_in(dir.path());
        let mut launcher = RecordingLauncher {
            calls: vec![],
            fail_on: vec![],
        };
        let mut out = Vec::new();
        let options = SweepOptions {
            dry_run: true,
            fail_fast: false,
        };
        let report = run_sweep(&plan, options, &mut launcher, &mut out).unwrap();
        assert!(launcher.calls.is_empty());
        assert_eq!(report.runs.len(), 4);
        assert!(report.runs.iter().all(|r| r.outcome.as_planned().is_some()));
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 4);
        for label in &plan.labels {
            assert!(printed.contains(&format!("--l1d_size={}", label.size_arg())));
        }
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn test_failures_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_in(dir.path());
        let mut launcher = RecordingLauncher {
            calls: vec![],
            fail_on: vec!["8kB_assoc2".into()],
        };
        let mut out = Vec::new();
        let report = run_sweep(&plan, SweepOptions::default(), &mut launcher, &mut out).unwrap();
        assert_eq!(launcher.calls.len(), 4);
        assert_eq!(report.completed(), 3);
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].label, "8kB_assoc2");
        assert_eq!(failed[0].outcome, RunOutcome::Failed("exit code 1".into()));
        assert!(dir.path().join("results/matrix_mult/16kB_assoc2").is_dir());
    }

    #[test]
    fn test_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_in(dir.path());
        let mut launcher = RecordingLauncher {
            calls: vec![],
            fail_on: vec!["8kB_assoc1".into()],
        };
        let options = SweepOptions {
            dry_run: false,
            fail_fast: true,
        };
        let err = run_sweep(&plan, options, &mut launcher, &mut Vec::new()).unwrap_err();
        assert_eq!(launcher.calls.len(), 1);
        assert!(err.to_string().contains("8kB_assoc1"));
    }

    #[test]
    fn test_unwritable_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = plan_in(dir.path());
        // a plain file where the results directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        plan.results_dir = blocked;
        let mut launcher = RecordingLauncher {
            calls: vec![],
            fail_on: vec![],
        };
        let report = run_sweep(&plan, SweepOptions::default(), &mut launcher, &mut Vec::new())
            .unwrap();
        assert!(launcher.calls.is_empty());
        assert_eq!(report.runs.len(), 4);
        assert_eq!(report.failed().len(), 4);
        assert!(report.runs[0]
            .outcome
            .as_failed()
            .unwrap()
            .starts_with("failed to create"));

        let options = SweepOptions {
            dry_run: false,
            fail_fast: true,
        };
        let err = run_sweep(&plan, options, &mut launcher, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("8kB_assoc1"));
    }

    #[test]
    fn test_missing_simulator() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = plan_in(dir.path());
        plan.simulator.simulator = dir.path().join("nope").to_string_lossy().to_string();
        let mut launcher = RecordingLauncher {
            calls: vec![],
            fail_on: vec![],
        };
        let err = run_sweep(&plan, SweepOptions::default(), &mut launcher, &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("simulator binary not found"));
        assert!(launcher.calls.is_empty());

        // a dry run doesn't need the simulator
        let options = SweepOptions {
            dry_run: true,
            fail_fast: false,
        };
        assert!(run_sweep(&plan, options, &mut launcher, &mut Vec::new()).is_ok());
    }

    #[test]
    fn test_missing_kernel_binary() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = plan_in(dir.path());
        plan.kernel_binary = dir.path().join("not_built");
        let err = plan.validate(true).unwrap_err();
        assert!(matches!(err, LabError::MissingBinary(_)));
    }

    #[test]
    fn test_resolve_program() {
        assert!(resolve_program(Path::new("/definitely/not/gem5.opt")).is_none());
        assert_eq!(kernel_name(Path::new("bin/stream_bench.elf")), "stream_bench");
    }
}
