use std::path::PathBuf;
use std::process::Command;

use log::debug;

/// one fully formatted simulator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// the invocation as a shell-like line, for dry runs and logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// how a finished run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,
    pub code: Option<i32>,
}

/// runs an invocation to completion, the seam between the sweep and the outside world
pub trait Launcher {
    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<ExitReport>;
}

/// blocking subprocess launcher, inherits stdout/stderr so the simulator's output stays visible
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<ExitReport> {
        debug!("spawning {}", invocation.command_line());
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()?;
        Ok(ExitReport {
            success: status.success(),
            code: status.code(),
        })
    }
}
