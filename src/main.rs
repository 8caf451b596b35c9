use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;
use vacancy_stats::error::util::safe_open_file;
use vacancy_stats::utils::io::split_by_year;
use vacancy_stats::utils::logging::log_operation_complete;
use vacancy_stats::{
    PipelineConfig, PipelineOutput, run_partition_dir, run_partition_files, run_pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "vacancy-stats")]
#[command(version)]
#[command(about = "Salary and posting statistics over job-vacancy CSV exports", long_about = None)]
struct Args {
    /// Vacancy CSV file
    #[arg(required_unless_present = "partition_dir")]
    input: Option<PathBuf>,

    /// Role substring for the per-role projections
    #[arg(short, long)]
    role: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Aggregate per year partition on a worker pool
    #[arg(long)]
    parallel: bool,

    /// `currency,rate` CSV replacing the built-in rates
    #[arg(long, conflicts_with = "rate_history")]
    currency_table: Option<PathBuf>,

    /// Monthly rate sheet; each vacancy converts at its publication month
    #[arg(long)]
    rate_history: Option<PathBuf>,

    /// Worker pool size
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print projections as JSON
    #[arg(long)]
    json: bool,

    /// Split INPUT into one CSV per year in this directory and aggregate the files
    #[arg(long, conflicts_with = "partition_dir")]
    split_dir: Option<PathBuf>,

    /// Aggregate a directory of per-year CSV files
    #[arg(long)]
    partition_dir: Option<PathBuf>,

    /// Show progress bars
    #[arg(long)]
    progress: bool,
}

impl Args {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_path(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(role) = &self.role {
            config.role.clone_from(role);
        }
        if let Some(path) = &self.currency_table {
            config.currency_table = Some(path.clone());
            config.rate_history = None;
        }
        if let Some(path) = &self.rate_history {
            config.rate_history = Some(path.clone());
            config.currency_table = None;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.parallel |= self.parallel;
        config.show_progress |= self.progress;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.pipeline_config()?;
    let rates = config
        .exchange_rates()
        .context("Failed to load exchange rates")?;

    let output: PipelineOutput = if let Some(dir) = &args.partition_dir {
        run_partition_dir(dir, &config, rates.as_ref())
            .with_context(|| format!("Failed to aggregate partitions in {}", dir.display()))?
    } else {
        let Some(input) = &args.input else {
            bail!("No input file given");
        };

        if let Some(dir) = &args.split_dir {
            let start = Instant::now();
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let file = safe_open_file(input, "vacancy data")?;
            let (paths, stats) = split_by_year(file, dir)
                .with_context(|| format!("Failed to split {}", input.display()))?;
            log_operation_complete(input, stats, Some(start.elapsed()));
            info!("Wrote {} partition files", paths.len());

            // Only the files written by this split, not older ones in the same directory
            run_partition_files(&paths, &config, rates.as_ref())
                .with_context(|| format!("Failed to aggregate partitions in {}", dir.display()))?
        } else {
            run_pipeline(input, &config, rates.as_ref())
                .with_context(|| format!("Failed to aggregate {}", input.display()))?
        }
    };

    if args.json {
        println!("{}", output.projections.to_json()?);
    } else {
        println!("{}", output.projections);
    }

    Ok(())
}
