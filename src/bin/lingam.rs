//! lingam CLI — causal structure discovery over a CSV table
//!
//! Usage:
//!   lingam                                  data.csv → result.csv
//!   lingam -i obs.csv -o graph.csv          explicit paths
//!   lingam -c lingam.json                   JSON config (flags override it)
//!   lingam -m kernel --min-effect 0.05      measure and pruning
//!   lingam --prior-knowledge pk.csv         -1/0/1 path constraints
//!   lingam --bootstrap 100 --seed 7         edge probabilities
//!   lingam --order-out order.csv --report run.json

use clap::Parser;
use lingam_core::config::PipelineConfig;
use lingam_core::{MatrixLayout, Measure};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lingam", version, about = "Estimate a causal DAG from a CSV table with DirectLiNGAM")]
struct Cli {
    /// JSON pipeline configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input table: one sample per line, comma separated, no header [default: data.csv]
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Adjacency matrix output [default: result.csv]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Independence measure for the causal order search: pwling or kernel
    #[arg(short, long)]
    measure: Option<Measure>,

    /// Drop edges whose magnitude is below this value
    #[arg(long, value_name = "X")]
    min_effect: Option<f64>,

    /// Output orientation: source-rows (row = cause) or target-rows (row = effect)
    #[arg(long)]
    layout: Option<MatrixLayout>,

    /// Prior knowledge matrix (-1 unknown, 0 no path, 1 path; row = source)
    #[arg(long, value_name = "FILE")]
    prior_knowledge: Option<PathBuf>,

    /// Write the estimated causal order to this file
    #[arg(long, value_name = "FILE")]
    order_out: Option<PathBuf>,

    /// Number of bootstrap resamples
    #[arg(long, value_name = "N")]
    bootstrap: Option<usize>,

    /// Bootstrap edge probability output [default: probabilities.csv]
    #[arg(long, value_name = "FILE")]
    probabilities_out: Option<PathBuf>,

    /// Bootstrap RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> lingam_core::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(measure) = self.measure {
            config.estimator.measure = measure;
        }
        if let Some(min_effect) = self.min_effect {
            config.estimator.min_effect = min_effect;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if self.prior_knowledge.is_some() {
            config.prior_knowledge = self.prior_knowledge;
        }
        if self.order_out.is_some() {
            config.order_output = self.order_out;
        }
        if self.report.is_some() {
            config.report = self.report;
        }

        if self.bootstrap.is_some() || self.probabilities_out.is_some() || self.seed.is_some() {
            let mut b = config.bootstrap.take().unwrap_or_default();
            if let Some(n) = self.bootstrap {
                b.n_sampling = n;
            }
            if let Some(path) = self.probabilities_out {
                b.output = path;
            }
            if let Some(seed) = self.seed {
                b.seed = seed;
            }
            config.bootstrap = Some(b);
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("config stage failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match lingam_core::run(&config) {
        Ok(report) => {
            println!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
