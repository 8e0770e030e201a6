//! cytofreq - immune-cell frequency analysis CLI
//!
//! Command-line interface for building population frequency tables and
//! comparing responders with non-responders.

use clap::{Parser, Subcommand, ValueEnum};
use cytofreq::data::{CohortFilter, Dataset, PopulationSet};
use cytofreq::error::Result;
use cytofreq::io::{
    create_output, load_cell_counts, write_comparison_tsv, write_dropped_tsv,
    write_frequency_tsv, write_json,
};
use cytofreq::normalize::CompletenessPolicy;
use cytofreq::pipeline::{baseline_summary, Analysis, AnalysisConfig};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output format for tables
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Tab-separated values with a header row
    Tsv,
    /// Pretty-printed JSON
    Json,
}

/// Immune-cell population frequency analysis
#[derive(Parser)]
#[command(name = "cytofreq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-sample population frequencies
    Frequencies {
        /// Path to the cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Cohort filter as attribute=value (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "tsv")]
        format: OutputFormat,

        /// Exclude samples missing a population instead of failing
        #[arg(long)]
        drop_incomplete: bool,

        /// Write excluded samples to this TSV
        #[arg(long)]
        dropped: Option<PathBuf>,
    },

    /// Compare responders and non-responders per population
    Compare {
        /// Path to the cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Cohort filter as attribute=value (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "tsv")]
        format: OutputFormat,

        /// Exclude samples missing a population instead of failing
        #[arg(long)]
        drop_incomplete: bool,
    },

    /// Run an analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the frequency table TSV
        #[arg(long)]
        frequencies: Option<PathBuf>,

        /// Output path for the comparison TSV (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the baseline melanoma / miraclib / PBMC cohort
    Summary {
        /// Path to the cell-count CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Generate an example analysis configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Frequencies {
            input,
            filters,
            output,
            format,
            drop_incomplete,
            dropped,
        } => cmd_frequencies(
            &input,
            &filters,
            output.as_deref(),
            format,
            drop_incomplete,
            dropped.as_deref(),
        ),

        Commands::Compare {
            input,
            filters,
            output,
            format,
            drop_incomplete,
        } => cmd_compare(&input, &filters, output.as_deref(), format, drop_incomplete),

        Commands::Run {
            config,
            input,
            frequencies,
            output,
        } => cmd_run(&config, &input, frequencies.as_deref(), output.as_deref()),

        Commands::Summary { input, format } => cmd_summary(&input, &format),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(create_output(p)?),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn load(input: &Path) -> Result<Dataset> {
    load_cell_counts(input, &PopulationSet::standard())
}

fn policy(drop_incomplete: bool) -> CompletenessPolicy {
    if drop_incomplete {
        CompletenessPolicy::DropIncomplete
    } else {
        CompletenessPolicy::Strict
    }
}

/// Compute the frequency table
fn cmd_frequencies(
    input: &Path,
    filters: &[String],
    output: Option<&Path>,
    format: OutputFormat,
    drop_incomplete: bool,
    dropped_path: Option<&Path>,
) -> Result<()> {
    let dataset = load(input)?;
    let analysis = Analysis::new()
        .name("frequencies")
        .with_filter(CohortFilter::parse_pairs(filters)?)
        .completeness(policy(drop_incomplete));
    let table = analysis.frequencies(&dataset)?;

    if !table.dropped.is_empty() {
        eprintln!("{} samples excluded from normalization", table.dropped.len());
    }
    if let Some(path) = dropped_path {
        write_dropped_tsv(&table, create_output(path)?)?;
    }

    let out = open_output(output)?;
    match format {
        OutputFormat::Tsv => write_frequency_tsv(&table, out),
        OutputFormat::Json => write_json(&table, out),
    }
}

/// Compare response groups
fn cmd_compare(
    input: &Path,
    filters: &[String],
    output: Option<&Path>,
    format: OutputFormat,
    drop_incomplete: bool,
) -> Result<()> {
    let dataset = load(input)?;
    let result = Analysis::new()
        .name("compare")
        .with_filter(CohortFilter::parse_pairs(filters)?)
        .completeness(policy(drop_incomplete))
        .run(&dataset)?;

    eprintln!(
        "{} populations compared, {} tested, {} significant",
        result.comparison.len(),
        result.comparison.n_tested,
        result.comparison.significant().len()
    );
    for hit in result.comparison.sorted_by_p_adj() {
        if let (true, Some(q)) = (hit.significant, hit.p_adj) {
            eprintln!("  {:<12} q = {:.3e}", hit.population, q);
        }
    }

    let out = open_output(output)?;
    match format {
        OutputFormat::Tsv => write_comparison_tsv(&result.comparison, out),
        OutputFormat::Json => write_json(&result.comparison, out),
    }
}

/// Run an analysis from configuration
fn cmd_run(
    config_path: &Path,
    input: &Path,
    frequencies_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    info!("Loading analysis configuration from {}", config_path.display());
    let config_str = std::fs::read_to_string(config_path)?;
    let config = AnalysisConfig::from_yaml(&config_str)?;

    let dataset = load(input)?;
    let result = Analysis::from_config(&config).run(&dataset)?;

    if let Some(path) = frequencies_path {
        write_frequency_tsv(&result.frequencies, create_output(path)?)?;
    }
    write_comparison_tsv(&result.comparison, open_output(output)?)?;

    eprintln!(
        "Done! '{}': {} of {} populations significant",
        result.name,
        result.comparison.significant().len(),
        result.comparison.len()
    );
    Ok(())
}

/// Summarize the baseline cohort
fn cmd_summary(input: &Path, format: &str) -> Result<()> {
    let dataset = load(input)?;
    let summary = baseline_summary(&dataset)?;

    match format {
        "json" => write_json(&summary, open_output(None)?)?,
        _ => {
            print!("{}", summary.cohort);
            match summary.mean_b_cell_male_responders {
                Some(mean) => println!("  Mean b_cell count, male melanoma responders at baseline: {:.2}", mean),
                None => println!("  Mean b_cell count, male melanoma responders at baseline: NA"),
            }
        }
    }
    Ok(())
}

/// Write an example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let yaml = AnalysisConfig::example().to_yaml()?;
    std::fs::write(output_path, yaml)?;
    eprintln!("Example configuration written to {}", output_path.display());
    Ok(())
}
