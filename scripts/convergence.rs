// scripts/convergence.rs
//! Convergence study runner.
//!
//! Prices one European option at increasing path counts, prints the error
//! against Black-Scholes and writes the table to a timestamped CSV.
//!
//! ```text
//! mc-convergence --sample-counts 100,1000,10000,100000 --output-dir results
//! mc-convergence --config study.toml --put
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use mc_pricer::analytics::convergence::{convergence_study, ConvergencePoint};
use mc_pricer::mc::mc_engine::{mc_simulate_and_price, McConfig};
use mc_pricer::mc::paths::SimulationScheme;
use mc_pricer::mc::payoffs::OptionType;
use mc_pricer::output;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Monte Carlo vs Black-Scholes convergence study
#[derive(Parser, Debug)]
#[command(name = "mc-convergence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with a `sample_counts` list and a `[pricing]` table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated path counts
    #[arg(long, value_delimiter = ',')]
    sample_counts: Option<Vec<usize>>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    steps: Option<usize>,

    /// Price a put instead of a call
    #[arg(long)]
    put: bool,

    /// Use the step-by-step scheme instead of the vectorized one
    #[arg(long)]
    step_by_step: bool,

    /// Generate paths in parallel with per-path substreams
    #[arg(long)]
    parallel: bool,

    /// Also export the paths and mean path of a run with this many paths
    #[arg(long)]
    export_paths: Option<usize>,

    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StudyConfig {
    pricing: McConfig,
    sample_counts: Vec<usize>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            pricing: McConfig::default(),
            sample_counts: vec![100, 1_000, 10_000, 100_000],
        }
    }
}

impl StudyConfig {
    fn load(cli: &Cli) -> Result<Self> {
        let mut study = match &cli.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => StudyConfig::default(),
        };

        if let Some(counts) = &cli.sample_counts {
            study.sample_counts = counts.clone();
        }
        if let Some(seed) = cli.seed {
            study.pricing.seed = seed;
        }
        if let Some(steps) = cli.steps {
            study.pricing.steps = steps;
        }
        if cli.put {
            study.pricing.option_type = OptionType::Put;
        }
        if cli.step_by_step {
            study.pricing.scheme = SimulationScheme::StepByStep;
        }
        if cli.parallel {
            study.pricing.parallel = true;
        }

        if study.sample_counts.is_empty() {
            bail!("no sample counts given");
        }
        study.pricing.validate()?;
        Ok(study)
    }
}

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

fn write_results_to_csv(
    filename: &Path,
    points: &[ConvergencePoint],
    study: &StudyConfig,
    system_info: &SystemInfo,
) -> Result<()> {
    let mut file = BufWriter::new(
        File::create(filename).with_context(|| format!("creating {}", filename.display()))?,
    );
    let p = &study.pricing;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Run Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        file,
        "# {:?} S0={} K={} T={} r={} q={} sigma={} steps={} seed={}",
        p.option_type, p.s0, p.strike, p.t, p.r, p.q, p.sigma, p.steps, p.seed
    )?;
    output::write_convergence(&mut file, points)?;
    file.flush()?;
    Ok(())
}

fn print_table(points: &[ConvergencePoint]) {
    println!("\n{:=<80}", "");
    println!("CONVERGENCE STUDY");
    println!("{:=<80}", "");
    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>12} {:>8} {:>12}",
        "Paths", "MC Price", "Std Error", "Analytic", "Abs Error", "Z", "Time (ms)"
    );
    println!("{:-<80}", "");
    for p in points {
        let z = p.z_score().map(|z| format!("{:.2}", z)).unwrap_or_else(|| "-".to_string());
        println!(
            "{:>10} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>8} {:>12.2}",
            p.paths, p.mc_price, p.std_error, p.analytic_price, p.abs_error, z, p.elapsed_ms
        );
    }
    println!("{:=<80}", "");
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let study = StudyConfig::load(&cli)?;
    let system_info = SystemInfo::gather();
    info!(
        cores = system_info.cpu_cores,
        rayon_threads = system_info.rayon_threads,
        "starting mc-convergence"
    );

    let points = convergence_study(&study.pricing, &study.sample_counts)?;
    print_table(&points);

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = cli
        .output_dir
        .join(format!("convergence_{}.csv", timestamp));
    write_results_to_csv(&filename, &points, &study, &system_info)?;
    info!(file = %filename.display(), "convergence table written");

    if let Some(paths) = cli.export_paths {
        let cfg = McConfig {
            paths,
            ..study.pricing.clone()
        };
        let (matrix, result) = mc_simulate_and_price(&cfg)?;
        let paths_file = cli.output_dir.join(format!("paths_{}.csv", timestamp));
        let mean_file = cli.output_dir.join(format!("mean_path_{}.csv", timestamp));
        output::write_paths_to_csv(&paths_file, &matrix)?;
        output::write_mean_path_to_csv(&mean_file, &matrix)?;
        info!(
            paths,
            price = result.option_price,
            file = %paths_file.display(),
            "paths exported"
        );
    }

    Ok(())
}
