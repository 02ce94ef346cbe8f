use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::string::String;

/// the config file read when present, before the ones passed with `-c`
pub const DEFAULT_CONFIG: &str = "configs/default.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub results_dir: String,
    pub simulator_settings: SimulatorSettings,
    pub sweep_settings: SweepSettings,
}

/// the external simulator and the fixed part of its command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorSettings {
    pub simulator: String,
    pub config_script: String,
    /// the flag that sets the simulator output directory, empty to not pass one
    pub outdir_flag: String,
    pub extra_args: Vec<String>,
}

/// the swept L1D values and the cache levels held constant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSettings {
    pub l1d_sizes: Vec<String>,
    pub l1d_assocs: Vec<u32>,
    pub l1i_size: String,
    pub l1i_assoc: u32,
    pub l2_size: String,
    pub l2_assoc: u32,
}

impl Settings {
    /// # Description
    /// layered settings, later layers win:
    /// 1. built in defaults
    /// 2. `configs/default.toml` if it exists
    /// 3. every file of `config_path`, these must exist
    /// 4. `CACHE_LAB_*` environment variables, `__` separates sections,
    ///    e.g. `CACHE_LAB_SIMULATOR_SETTINGS__SIMULATOR=/opt/gem5/build/X86/gem5.opt`
    pub fn new(config_path: Vec<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("results_dir", "results")?
            .set_default("simulator_settings.simulator", "build/X86/gem5.opt")?
            .set_default("simulator_settings.config_script", "configs/cache_experiment.py")?
            .set_default("simulator_settings.outdir_flag", "--outdir")?
            .set_default("simulator_settings.extra_args", Vec::<String>::new())?
            .set_default(
                "sweep_settings.l1d_sizes",
                vec!["8kB", "16kB", "32kB", "64kB", "128kB"],
            )?
            .set_default("sweep_settings.l1d_assocs", vec![1i64, 2, 4, 8])?
            .set_default("sweep_settings.l1i_size", "16kB")?
            .set_default("sweep_settings.l1i_assoc", 2i64)?
            .set_default("sweep_settings.l2_size", "256kB")?
            .set_default("sweep_settings.l2_assoc", 8i64)?
            .add_source(File::with_name(DEFAULT_CONFIG).required(false));
        for i in config_path {
            builder = builder.add_source(File::from(Path::new(&i)));
        }
        builder
            .add_source(
                Environment::with_prefix("CACHE_LAB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
