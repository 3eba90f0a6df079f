//! lathe CLI - rotational contours from STEP files
//!
//! Reads one or more STEP files, extracts their rotational surfaces, and
//! prints each part's cross-section contour as JSON, one document per file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

mod config;
mod report;

use config::Config;
use report::{contour_file, Extractor, FileReport};

#[derive(Parser)]
#[command(name = "lathe")]
#[command(about = "Build rotational cross-section contours from STEP files", long_about = None)]
struct Cli {
    /// Config file (default: ./lathe.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the contour of each file
    Contour {
        /// STEP files (.step or .stp)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Surface extractor
        #[arg(short, long, value_enum, default_value_t = ExtractorChoice::Auto)]
        extractor: ExtractorChoice,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the features extracted from a file
    Features {
        /// STEP file
        file: PathBuf,
        /// Surface extractor
        #[arg(short, long, value_enum, default_value_t = ExtractorChoice::Auto)]
        extractor: ExtractorChoice,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtractorChoice {
    /// B-rep topology reader
    Brep,
    /// Regex text scanner
    Text,
    /// B-rep, falling back to text
    Auto,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Contour {
            files,
            extractor,
            pretty,
        } => run_contour(&files, extractor, pretty, &config),
        Commands::Features {
            file,
            extractor,
            pretty,
        } => show_features(&file, extractor, pretty, &config),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn to_json(value: &impl serde::Serialize, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn run_contour(
    files: &[PathBuf],
    choice: ExtractorChoice,
    pretty: bool,
    config: &Config,
) -> Result<()> {
    let extractor = Extractor::new(choice, config);
    // files are independent; output keeps argument order
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| contour_file(path, &extractor, config))
        .collect();

    let mut faults = 0;
    for report in &reports {
        println!("{}", to_json(report, pretty)?);
        if report.is_fault() {
            faults += 1;
        }
    }
    if faults > 0 {
        bail!("{faults} of {} files could not be read or extracted", reports.len());
    }
    Ok(())
}

fn show_features(
    file: &Path,
    choice: ExtractorChoice,
    pretty: bool,
    config: &Config,
) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let (name, part) = Extractor::new(choice, config)
        .extract(&data)
        .with_context(|| format!("extracting {}", file.display()))?;
    tracing::info!(extractor = name, features = part.features.len(), "extracted");
    println!("{}", to_json(&part, pretty)?);
    Ok(())
}
