// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Pseudo-random number generation from chaotic double-pendulum
//! dynamics, with statistical comparison against OS entropy.

pub mod comparison;
pub mod conditioning;
pub mod ensemble;
pub mod error;
pub mod generator;
pub mod pendulum;
pub mod stats;
pub mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use comparison::ReferenceSource;
use ensemble::GenerationConfig;
use stats::SampleSummary;

#[derive(Parser)]
#[command(name = "tych")]
#[command(about = "Chaotic double-pendulum pseudo-random number generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate pseudo-random numbers
    Generate {
        /// Number of values to generate
        #[arg(short = 'n', long = "count", default_value_t = 1000)]
        count: usize,

        /// Number of pendulums to simulate
        #[arg(short, long, default_value_t = ensemble::DEFAULT_N_PENDULUMS)]
        pendulums: usize,

        /// Noise level injected into the state blend
        #[arg(long, default_value_t = 0.2)]
        noise: f64,

        /// Seed for reproducible output (omit for OS entropy)
        #[arg(long)]
        seed: Option<u64>,

        /// Output file, one value per line (printed to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Compare the generator against an OS entropy reference
    Compare {
        /// Sample size per side
        #[arg(short = 'n', long = "count", default_value_t = 10000)]
        count: usize,

        /// Number of pendulums to simulate
        #[arg(short, long, default_value_t = ensemble::DEFAULT_N_PENDULUMS)]
        pendulums: usize,

        /// Noise level injected into the state blend
        #[arg(long, default_value_t = 0.2)]
        noise: f64,

        /// Report file (printed to stdout only if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            count,
            pendulums,
            noise,
            seed,
            output,
        } => run_generate(count, pendulums, noise, seed, output),
        Commands::Compare {
            count,
            pendulums,
            noise,
            output,
        } => run_compare(count, pendulums, noise, output),
    }
}

fn run_generate(
    count: usize,
    pendulums: usize,
    noise: f64,
    seed: Option<u64>,
    output: Option<String>,
) -> Result<()> {
    println!("Generating {count} values ({pendulums} pendulums, noise {noise})...");
    let config = GenerationConfig {
        n: count,
        n_pendulums: pendulums,
        noise_level: noise,
        seed,
    };
    let values = generator::generate_with_config(&config)?;
    match output {
        Some(path) => {
            utils::write_sequence(&path, &values)
                .with_context(|| format!("failed to write {path}"))?;
            println!("Saved {} values to {}", values.len(), path);
        }
        None => {
            let preview: Vec<String> = values.iter().take(10).map(|v| format!("{v:.6}")).collect();
            println!("First values: {}", preview.join(", "));
        }
    }
    print_summary("Sequence", &SampleSummary::describe(&values));
    Ok(())
}

fn run_compare(count: usize, pendulums: usize, noise: f64, output: Option<String>) -> Result<()> {
    println!("Comparing generator output against OS entropy (n = {count})...");
    let config = GenerationConfig {
        n: count,
        n_pendulums: pendulums,
        noise_level: noise,
        seed: None,
    };
    let sample = generator::generate_with_config(&config)?;
    let (reference, source) = comparison::reference_sample(count);
    let mut result = comparison::compare_samples(&sample, &reference)?;
    result.reference_source = source;
    let mut report = vec![
        format!("tych comparison report - {}", chrono::Local::now().to_rfc3339()),
        format!(
            "KS statistic: {:.6}   p-value: {:.6}",
            result.ks_statistic, result.p_value
        ),
        if result.p_value < 0.05 {
            "=> distributions likely differ (p < 0.05)".to_owned()
        } else {
            "=> no significant difference detected (p >= 0.05)".to_owned()
        },
        summary_line("Pendulum ", &result.generator),
        summary_line("Reference", &result.reference),
    ];
    if result.reference_source == ReferenceSource::SeededFallback {
        report.push("WARNING: OS entropy unavailable, reference used clock-seeded fallback".into());
    }
    report.push(distribution_lines(&sample)?);
    let report = report.join("\n");
    println!("{report}");
    if let Some(path) = output {
        std::fs::write(&path, report + "\n").with_context(|| format!("failed to write {path}"))?;
        println!("Report saved to {path}");
    }
    Ok(())
}

/// Uniformity verdict and ten-bin histogram of the compared sample,
/// the text stand-in for the density plot an external renderer would
/// draw from the same numbers. The uniformity test is skipped for
/// samples too small to fill the bins.
fn distribution_lines(sample: &[f64]) -> Result<String> {
    const BINS: usize = 10;
    let mut lines = Vec::new();
    if sample.len() >= BINS {
        let (chi_squared, p) = stats::bin_uniformity_test(sample, BINS)?;
        lines.push(format!("Uniformity chi2 = {chi_squared:.4}   p-value = {p:.6}"));
    }
    lines.push("Density per bin:".to_owned());
    for (bin, d) in stats::histogram_density(sample, BINS, 0.0, 1.0).iter().enumerate() {
        lines.push(format!(
            "[{:.1}-{:.1}): {:.4}",
            bin as f64 / BINS as f64,
            (bin + 1) as f64 / BINS as f64,
            d
        ));
    }
    Ok(lines.join("\n"))
}


fn print_summary(label: &str, summary: &SampleSummary) {
    println!("{}", summary_line(label, summary));
}

fn summary_line(label: &str, s: &SampleSummary) -> String {
    format!(
        "{label}: n = {}  mean = {:.6}  std = {:.6}  min = {:.6}  max = {:.6}",
        s.len, s.mean, s.std_dev, s.min, s.max
    )
}
