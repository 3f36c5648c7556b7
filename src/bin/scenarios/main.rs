// Slope Scenario Runner v0.1.0: risk model checks, Monte Carlo sweep, alert drills
// Seedable PRNG (ChaCha8Rng), per-zone aggregation, JSON report
//
// Usage:
//   cargo run --release --bin scenarios                          # Everything, built-in zones
//   cargo run --release --bin scenarios -- --runs 2000           # Larger sweep per zone
//   cargo run --release --bin scenarios -- --config site.toml    # Custom zones/timing
//   cargo run --release --bin scenarios -- --seed 42 --out tmp   # Custom seed and output dir
//   cargo run --release --bin scenarios -- sector7g              # Filter by zone or case name

mod checks;
mod drills;
mod report;
mod sweep;

use report::*;
use slope_engine::EngineConfig;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// How long each drill lets the alarm ring before and after acknowledging.
const DRILL_RING_MS: u64 = 5_000;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    config: Option<PathBuf>,
    out: PathBuf,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 500,
        seed: 0,
        config: None,
        out: PathBuf::from("scenario-results"),
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(500);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(PathBuf::from(&args[i]));
                }
            }
            "--out" => {
                i += 1;
                if i < args.len() {
                    cli.out = PathBuf::from(&args[i]);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn matches_filter(filter: &Option<String>, candidates: &[&str]) -> bool {
    match filter {
        Some(f) => {
            let f = f.to_lowercase();
            candidates.iter().any(|c| c.to_lowercase().contains(&f))
        }
        None => true,
    }
}

fn write_report(dir: &Path, report: &RunnerReport) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("scenarios-{}.json", report.timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}

fn pass_label(pass: bool) -> &'static str {
    if pass { "PASS" } else { "FAIL" }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = parse_args();
    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "cannot load config");
                std::process::exit(2);
            }
        },
        None => EngineConfig::default(),
    };

    println!("\n  Slope Scenario Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Samples/zone: {} | Base seed: {}\n", cli.runs, cli.seed);

    let suite_start = Instant::now();

    // ─── Fixed Scenario Checks ──────────────────────────────────────────

    println!("  {:<24} {:>4} {:>10} {:>10} {:>8}", "Scenario", "Base", "Stability", "Failure", "Class");
    println!("  {}", "-".repeat(64));
    let checks: Vec<CheckResult> = checks::cases()
        .iter()
        .filter(|c| matches_filter(&cli.filter, &[c.name, c.label]))
        .map(checks::run_case)
        .collect();
    for c in &checks {
        println!("  {:<24} {:>4} {:>6} ({:>2}) {:>6} ({:>2}) {:>8}  {}",
            c.name, c.baseline,
            c.stability_index, c.expected_stability_index,
            c.failure_probability_percent, c.expected_failure_probability_percent,
            c.failure_class.label(),
            pass_label(c.pass),
        );
    }

    // ─── Monte Carlo Sweep ──────────────────────────────────────────────

    println!("\n  {:<12} {:>4} {:>14} {:>14} {:>16} {:>5}",
        "Zone", "Base", "Stability", "Failure", "Low/Med/High", "OOB");
    println!("  {}", "-".repeat(72));
    let zones: Vec<(&str, _)> = config.catalog.iter()
        .filter(|(id, p)| matches_filter(&cli.filter, &[*id, p.name.as_str()]))
        .collect();
    let mut sweeps = Vec::new();
    for (i, (zone_id, profile)) in zones.iter().enumerate() {
        let r = sweep::run_sweep(zone_id, profile, cli.runs, cli.seed + i as u64);
        let ci = |s: &Stats| (s.ci_upper - s.ci_lower) / 2.0;
        println!("  {:<12} {:>4} {:>8.1}±{:<4.1} {:>8.1}±{:<4.1} {:>5}/{:>4}/{:>5} {:>5}  {}",
            r.zone_id, r.baseline,
            r.stability_index.mean, ci(&r.stability_index),
            r.failure_probability_percent.mean, ci(&r.failure_probability_percent),
            r.classes.low, r.classes.medium, r.classes.high,
            r.bounds_violations,
            pass_label(r.pass),
        );
        sweeps.push(r);
    }

    // ─── Alert Drills ───────────────────────────────────────────────────

    println!("\n  {:<12} {:>6} {:>6} {:>8} {:>8}", "Zone", "Conf", "Armed", "Pulses", "After");
    println!("  {}", "-".repeat(48));
    let mut drills = Vec::new();
    for (zone_id, _) in &zones {
        let d = drills::run_drill(zone_id, &config, DRILL_RING_MS);
        println!("  {:<12} {:>6.1} {:>6} {:>8} {:>8}  {}",
            d.zone_id, d.confidence, d.armed, d.pulses_before_ack, d.pulses_after_ack, pass_label(d.pass));
        drills.push(d);
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let summary = Summary::from_flags(
        checks.iter().map(|c| c.pass)
            .chain(sweeps.iter().map(|s| s.pass))
            .chain(drills.iter().map(|d| d.pass)),
    );
    println!("\n  Total: {}  Passed: {}  Failed: {}  Suite time: {:.2}s\n",
        summary.total, summary.passed, summary.failed, suite_start.elapsed().as_secs_f64());

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string();
    let failed = summary.failed;
    let report = RunnerReport {
        timestamp,
        version: "0.1.0",
        prng: "ChaCha8Rng",
        samples_per_zone: cli.runs,
        summary,
        checks,
        sweeps,
        drills,
    };

    match write_report(&cli.out, &report) {
        Ok(path) => info!(path = %path.display(), "report written"),
        Err(e) => {
            error!(error = %e, dir = %cli.out.display(), "failed to write report");
            std::process::exit(2);
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
