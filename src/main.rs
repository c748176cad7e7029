use anomaly_explorer::dataset::ColumnKind;
use anomaly_explorer::{sample, AnalysisConfig, AnomalyExplorer, Dataset, Selection};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anomaly-explorer")]
#[command(about = "Find which columns best explain the anomalous rows of a CSV")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample sensor CSV
    Sample {
        /// Where to write the CSV
        #[arg(short, long, default_value = "data/sample_sensor.csv")]
        output: PathBuf,

        /// Number of rows to generate
        #[arg(long, default_value_t = 300)]
        rows: usize,

        /// Seed for the generated noise
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Show the first rows of a CSV and which columns are numeric
    Preview {
        /// CSV file with a header row
        csv_file: PathBuf,

        /// Rows to show
        #[arg(short, long, default_value_t = 5)]
        rows: usize,
    },
    /// Rank column subsets by anomaly count
    Analyze {
        /// CSV file with a header row
        csv_file: PathBuf,

        /// Numeric columns to search over (comma separated, 3 at a time at most)
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Column to plot the most anomalous subset against
        #[arg(short, long)]
        axis: Option<String>,

        /// Write the full report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Expected share of anomalous rows (or set ANOMALY_CONTAMINATION)
        #[arg(long)]
        contamination: Option<f64>,

        /// Model seed (or set ANOMALY_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Sample { output, rows, seed } => run_sample(output, rows, seed),
        Commands::Preview { csv_file, rows } => run_preview(csv_file, rows),
        Commands::Analyze {
            csv_file,
            columns,
            axis,
            output,
            contamination,
            seed,
        } => run_analyze(csv_file, columns, axis, output, contamination, seed),
    }
}

fn run_sample(output: PathBuf, rows: usize, seed: u64) -> Result<()> {
    let mut df = sample::generate(rows, seed).context("Failed to generate sample data")?;
    let written = sample::write_csv(&mut df, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} rows to {}", written, output.display());
    Ok(())
}

fn run_preview(csv_file: PathBuf, rows: usize) -> Result<()> {
    let dataset = Dataset::load_csv(&csv_file)
        .with_context(|| format!("Failed to load {}", csv_file.display()))?;

    println!("{}", dataset.preview(rows));
    println!();
    for column in &dataset.schema().columns {
        let kind = match column.kind {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        };
        println!("  {:<24} {:<12} {}", column.name, kind, column.data_type);
    }
    Ok(())
}

fn run_analyze(
    csv_file: PathBuf,
    columns: Vec<String>,
    axis: Option<String>,
    output: Option<PathBuf>,
    contamination: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let config = AnalysisConfig::from_env()?.with_overrides(contamination, seed)?;

    let dataset = Dataset::load_csv(&csv_file)
        .with_context(|| format!("Failed to load {}", csv_file.display()))?;

    let columns: Vec<String> = columns
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let explorer = AnomalyExplorer::new(config)?;
    let report = explorer.run(&dataset, &Selection::new(columns, axis))?;

    println!("{}", report);

    if let Some(path) = output {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
