use cache_lab::{
    analysis::{render_summary, Analysis},
    cmd_args::{Args, LabCommand},
    error::LabError,
    kernels,
    metrics::{Dependent, Independent},
    plot::{self, ChartData},
    results::{all_keys, collect_results, RunResult},
    settings::Settings,
    sweep::{self, ProcessLauncher, SweepManifest, SweepOptions, SweepPlan},
};
use clap::{Command, CommandFactory, Parser};
use clap_complete::{generate, Generator};
use log::{debug, info};
use std::{
    error::Error,
    io,
    path::{Path, PathBuf},
};

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;

    if let Some(generator) = args.generator {
        let mut cmd = Args::command();
        eprintln!("Generating completion file for {:?}...", generator);
        print_completions(generator, &mut cmd);
        return Ok(());
    }
    debug!("{:?}", args);

    let command = match args.command {
        Some(command) => command,
        None => {
            Args::command().print_help()?;
            return Ok(());
        }
    };

    match command {
        LabCommand::Kernel { name, seed, list } => run_kernel(name, seed, list),
        LabCommand::Sweep {
            binary,
            sizes,
            assocs,
            dry_run,
            fail_fast,
            simulator,
            script,
            results_dir,
            kernel,
            extra,
        } => {
            let mut settings = Settings::new(args.config_names)?;
            if let Some(simulator) = simulator {
                settings.simulator_settings.simulator = simulator;
            }
            if let Some(script) = script {
                settings.simulator_settings.config_script = script;
            }
            if let Some(results_dir) = results_dir {
                settings.results_dir = results_dir;
            }
            settings.simulator_settings.extra_args.extend(extra);
            debug!("{}", serde_json::to_string_pretty(&settings)?);

            let plan = SweepPlan::new(&settings, binary, kernel, &sizes, &assocs)?;
            run_sweep(&plan, SweepOptions { dry_run, fail_fast })
        }
        LabCommand::Analyze {
            results_dir,
            x_metric,
            y_metric,
            summary,
            json,
        } => run_analyze(&results_dir, x_metric, y_metric, summary, json),
        LabCommand::Plot {
            results_dir,
            x_metric,
            y_metric,
            output,
        } => run_plot(&results_dir, x_metric, y_metric, output),
        LabCommand::Keys { results_dir } => {
            let results = load(&results_dir)?;
            println!("Available stat keys:");
            for key in all_keys(&results) {
                println!("  {}", key);
            }
            Ok(())
        }
    }
}

fn run_kernel(name: Option<String>, seed: u64, list: bool) -> Result<(), Box<dyn Error>> {
    if list {
        for name in kernels::NAMES {
            let kernel = kernels::by_name(name, seed)?;
            println!("{:<12} {}", name, kernel.description());
        }
        return Ok(());
    }
    let name = name.ok_or_else(|| LabError::UnknownKernel(String::new(), kernels::NAMES.join(", ")))?;
    let kernel = kernels::by_name(&name, seed)?;
    let start_time = std::time::Instant::now();
    let checksum = kernel.run();
    let elapsed = start_time.elapsed().as_secs_f64();
    println!("{} completed in {:.6} seconds", kernel.name(), elapsed);
    println!("{}", checksum);
    Ok(())
}

fn run_sweep(plan: &SweepPlan, options: SweepOptions) -> Result<(), Box<dyn Error>> {
    let started = sweep::manifest_timestamp();
    let mut launcher = ProcessLauncher;
    let report = sweep::run_sweep(plan, options, &mut launcher, &mut io::stdout())?;
    if options.dry_run {
        println!("{} configurations planned", report.runs.len());
        return Ok(());
    }

    let manifest = SweepManifest {
        started,
        finished: sweep::manifest_timestamp(),
        kernel: &plan.kernel,
        kernel_binary: &plan.kernel_binary,
        simulator: Path::new(&plan.simulator.simulator),
        runs: &report.runs,
    };
    let manifest_path = manifest.write(&plan.results_dir)?;
    info!("sweep manifest written to {}", manifest_path.display());

    let failed = report.failed();
    println!(
        "{} of {} configurations completed",
        report.completed(),
        report.runs.len()
    );
    for run in failed {
        println!("  failed: {}", run.label);
    }
    Ok(())
}

fn load(results_dir: &Path) -> Result<Vec<RunResult>, Box<dyn Error>> {
    let results = collect_results(results_dir)?;
    if results.is_empty() {
        return Err(LabError::NoResults(results_dir.to_path_buf()).into());
    }
    debug!("found {} stats files in {}", results.len(), results_dir.display());
    Ok(results)
}

fn run_analyze(
    results_dir: &Path,
    x_metric: Independent,
    y_metric: Dependent,
    summary: bool,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let results = load(results_dir)?;
    let analysis = Analysis::new(&results, x_metric, y_metric);
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }
    println!("Analyzing results in: {}", results_dir.display());
    println!("X-axis: {}", analysis.independent);
    println!("Y-axis: {}", analysis.dependent);
    print!("{}", analysis.render_table());
    if summary {
        print!("{}", render_summary(&results));
    }
    Ok(())
}

fn run_plot(
    results_dir: &Path,
    x_metric: Independent,
    y_metric: Dependent,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    println!("Creating plot: {} vs {}", y_metric, x_metric);
    println!("Data source: {}", results_dir.display());
    let results = load(results_dir)?;
    let analysis = Analysis::new(&results, x_metric, y_metric);
    if !plot::available() {
        return Err(LabError::PlotUnavailable.into());
    }
    let data = ChartData::new(&analysis);
    if data.is_empty() {
        println!("No data points with both {} and {}", analysis.independent, analysis.dependent);
        return Ok(());
    }
    let output = output.unwrap_or_else(|| plot::default_output(&analysis));
    plot::render(&data, &output)?;
    println!("Plot saved to: {}", output.display());
    Ok(())
}
