use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::metrics::{Dependent, Independent};

#[derive(Parser, Debug)]
#[clap(author, version, about = "cache experiments: kernels, simulator sweeps and stats analysis")]
pub struct Args {
    /// extra config files, merged in order after configs/default.toml
    #[clap(short = 'c', long = "config", global = true)]
    pub config_names: Vec<String>,

    /// debug logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// print a shell completion script and exit
    #[clap(long = "generate", arg_enum)]
    pub generator: Option<Shell>,

    #[clap(subcommand)]
    pub command: Option<LabCommand>,
}

#[derive(Subcommand, Debug)]
pub enum LabCommand {
    /// run one benchmark kernel natively and print its checksum
    Kernel {
        /// kernel name, see --list
        #[clap(required_unless_present = "list")]
        name: Option<String>,
        #[clap(long, default_value_t = crate::kernels::DEFAULT_SEED)]
        seed: u64,
        /// list the available kernels
        #[clap(long)]
        list: bool,
    },
    /// run the simulator once per cache configuration
    Sweep {
        /// the kernel binary the simulator executes
        binary: PathBuf,
        /// L1D sizes, e.g. 8kB,16kB,32kB
        #[clap(long, use_value_delimiter = true)]
        sizes: Vec<String>,
        /// L1D associativities, e.g. 1,2,4
        #[clap(long, use_value_delimiter = true)]
        assocs: Vec<u32>,
        /// print the simulator commands without running them
        #[clap(long)]
        dry_run: bool,
        /// stop at the first failed configuration
        #[clap(long)]
        fail_fast: bool,
        /// the simulator binary, overrides the config file
        #[clap(long)]
        simulator: Option<String>,
        /// the simulator config script, overrides the config file
        #[clap(long)]
        script: Option<String>,
        #[clap(long)]
        results_dir: Option<String>,
        /// results sub directory, defaults to the binary's name
        #[clap(long)]
        kernel: Option<String>,
        /// passed through to the simulator
        #[clap(last = true)]
        extra: Vec<String>,
    },
    /// aggregate the stats of a results directory into a table
    Analyze {
        results_dir: PathBuf,
        #[clap(arg_enum)]
        x_metric: Independent,
        /// ipc, cpi, l1d_miss_rate, l1i_miss_rate, l2_miss_rate, execution_time,
        /// sim_insts, num_cycles or any stats key
        y_metric: Dependent,
        /// also print the per kernel IPC summary
        #[clap(long)]
        summary: bool,
        /// print the aggregated table as json
        #[clap(long)]
        json: bool,
    },
    /// draw the aggregated table as a chart
    Plot {
        results_dir: PathBuf,
        #[clap(arg_enum)]
        x_metric: Independent,
        y_metric: Dependent,
        /// output file, .svg or .png
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// list every stat key found in a results directory
    Keys { results_dir: PathBuf },
}
