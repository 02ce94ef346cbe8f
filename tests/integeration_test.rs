use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_stats(results: &Path, kernel: &str, label: &str, ipc: f64, misses: u64) {
    let dir = results.join(kernel).join(label);
    std::fs::create_dir_all(&dir).unwrap();
    let stats = format!(
        "---------- Begin Simulation Statistics ----------\n\
         simSeconds                                   0.001000                       # Number of seconds simulated (Second)\n\
         simInsts                                       100000                       # Number of instructions simulated (Count)\n\
         system.cpu.ipc                               {}                       # IPC: instructions per cycle ((Count/Cycle))\n\
         system.cpu.dcache.overallMisses::total         {}                       # number of overall misses (Count)\n\
         system.cpu.dcache.overallAccesses::total        1000                       # number of overall (read+write) accesses (Count)\n\
         ---------- End Simulation Statistics   ----------\n",
        ipc, misses
    );
    std::fs::write(dir.join("stats.txt"), stats).unwrap();
}

fn lab() -> Command {
    Command::cargo_bin("cache_lab").unwrap()
}

#[test]
fn test_analyze() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_stats(dir.path(), "matrix_mult", "8kB_assoc2", 0.4, 200);
    write_stats(dir.path(), "matrix_mult", "32kB_assoc2", 0.6, 50);
    write_stats(dir.path(), "stream", "8kB_assoc2", 0.9, 100);

    lab()
        .arg("analyze")
        .arg(dir.path())
        .arg("l1d_size")
        .arg("ipc")
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("MATRIX_MULT RESULTS:"))
        .stdout(predicate::str::contains("STREAM RESULTS:"))
        .stdout(predicate::str::contains("32kB"))
        .stdout(predicate::str::contains("0.6000"))
        .stdout(predicate::str::contains("Total results: 3"))
        .stdout(predicate::str::contains("Best cache size: 32kB"));

    lab()
        .arg("analyze")
        .arg(dir.path())
        .arg("l1d_size")
        .arg("l1d_miss_rate")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2000"))
        .stdout(predicate::str::contains("0.0500"));
    Ok(())
}

#[test]
fn test_analyze_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_stats(dir.path(), "branch", "16kB_assoc4", 1.5, 10);
    write_stats(dir.path(), "branch", "16kB_assoc8", 2.5, 10);

    let output = lab()
        .arg("analyze")
        .arg(dir.path())
        .arg("l1d_assoc")
        .arg("ipc")
        .arg("--json")
        .output()?;
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let rows = value["groups"]["branch"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["x"], 4);
    assert_eq!(rows[1]["aggregate"]["max"], 2.5);
    Ok(())
}

fn json_groups(output: &[u8]) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_slice(output).unwrap();
    value["groups"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_analyze_relative_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    write_stats(&results, "stream", "8kB_assoc2", 0.9, 100);
    write_stats(&results, "branch", "8kB_assoc2", 1.2, 10);

    for results_arg in ["results", "results/", "./results", "./results/"] {
        let output = lab()
            .current_dir(dir.path())
            .args(["analyze", results_arg, "l1d_size", "ipc", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", results_arg);
        assert_eq!(json_groups(&output.stdout), vec!["branch", "stream"], "{}", results_arg);
    }

    let output = lab()
        .current_dir(&results)
        .args(["analyze", ".", "l1d_size", "ipc", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_groups(&output.stdout), vec!["branch", "stream"]);
}

#[test]
fn test_analyze_json_with_empty_stats() {
    let dir = tempfile::tempdir().unwrap();
    write_stats(dir.path(), "branch", "16kB_assoc4", 1.5, 10);
    let empty = dir.path().join("branch").join("16kB_assoc8");
    std::fs::create_dir_all(&empty).unwrap();
    std::fs::write(empty.join("stats.txt"), "# nothing yet\n").unwrap();

    let output = lab()
        .arg("analyze")
        .arg(dir.path())
        .args(["l1d_assoc", "ipc", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    // the skipped file is reported on stderr, stdout stays parseable
    assert_eq!(json_groups(&output.stdout), vec!["branch"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("no stats in"));
}

#[test]
fn test_analyze_flat_stats_files() {
    let dir = tempfile::tempdir().unwrap();
    for (l2, ipc) in [("256kB", 0.4), ("1MB", 0.5)] {
        let name = format!(
            "stats_binarymatrix_mult_CPUX86TimingSimpleCPU_L1I16kB_L1D32kB_L2{}_1GHz.txt",
            l2
        );
        std::fs::write(dir.path().join(name), format!("system.cpu.ipc {}\n", ipc)).unwrap();
    }

    lab()
        .arg("analyze")
        .arg(dir.path())
        .args(["l2_size", "ipc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MATRIX_MULT RESULTS:"))
        .stdout(predicate::str::contains("256kB"))
        .stdout(predicate::str::contains("1024kB"))
        .stdout(predicate::str::contains("Total results: 2"));

    // these names carry no associativity
    lab()
        .arg("analyze")
        .arg(dir.path())
        .args(["l1d_assoc", "ipc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Excluded data points: 2"));
}

#[test]
fn test_missing_results_dir() {
    lab()
        .args(["analyze", "/no/such/results", "l1d_size", "ipc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("results directory not found"));
}

#[test]
fn test_empty_results_dir() {
    let dir = tempfile::tempdir().unwrap();
    lab()
        .arg("analyze")
        .arg(dir.path())
        .args(["l1d_size", "ipc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no simulation results found"));
}

#[test]
fn test_keys() {
    let dir = tempfile::tempdir().unwrap();
    write_stats(dir.path(), "hash_ops", "8kB_assoc1", 0.7, 3);
    lab()
        .arg("keys")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("system.cpu.dcache.overallMisses::total"))
        .stdout(predicate::str::contains("simInsts"));
}

#[test]
fn test_sweep_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("matrix_mult");
    std::fs::write(&binary, b"").unwrap();
    lab()
        .arg("sweep")
        .arg(&binary)
        .args(["--sizes", "8kB,16kB", "--assocs", "1,2", "--dry-run"])
        .arg("--results-dir")
        .arg(dir.path().join("results"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]").count(4))
        .stdout(predicate::str::contains("--l1d_size=16kB --l1d_assoc=2"))
        .stdout(predicate::str::contains("4 configurations planned"));
    assert!(!dir.path().join("results").exists());
}

#[test]
fn test_sweep_missing_simulator() {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("stream");
    std::fs::write(&binary, b"").unwrap();
    lab()
        .arg("sweep")
        .arg(&binary)
        .args(["--simulator", "/no/such/gem5.opt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("simulator binary not found"));
}

#[test]
fn test_sweep_missing_binary() {
    lab()
        .args(["sweep", "/no/such/kernel", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kernel binary not found"));
}

#[test]
fn test_kernel() {
    let run = || {
        lab()
            .args(["kernel", "image_blur"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Result checksum: output[100][100] = 200, output[200][200] = 144",
            ))
    };
    run();
    run();

    lab()
        .args(["kernel", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tlb_stress"));

    lab()
        .args(["kernel", "quicksort"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown kernel `quicksort`"));
}

#[cfg(not(feature = "plot"))]
#[test]
fn test_plot_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    write_stats(dir.path(), "stream", "8kB_assoc2", 0.9, 100);
    lab()
        .arg("plot")
        .arg(dir.path())
        .args(["l1d_size", "ipc", "-o"])
        .arg(dir.path().join("plot.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cache_lab analyze"));
}

#[cfg(not(feature = "plot"))]
#[test]
fn test_plot_unavailable_without_points() {
    let dir = tempfile::tempdir().unwrap();
    // no label in the directory name, nothing to draw
    write_stats(dir.path(), "stream", "scratch", 0.9, 100);
    lab()
        .arg("plot")
        .arg(dir.path())
        .args(["l1d_size", "ipc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("charting support is not available"));
}

#[cfg(feature = "plot")]
#[test]
fn test_plot() {
    let dir = tempfile::tempdir().unwrap();
    write_stats(dir.path(), "stream", "8kB_assoc2", 0.9, 100);
    write_stats(dir.path(), "stream", "16kB_assoc2", 1.1, 80);
    let output = dir.path().join("plot.svg");
    lab()
        .arg("plot")
        .arg(dir.path())
        .args(["l1d_size", "ipc", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plot saved to"));
    assert!(output.is_file());
}
