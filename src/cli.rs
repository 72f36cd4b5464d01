use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{config::ListDetection, report::ReportFormat};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile CSV columns into typed value-range reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every column of a CSV file and summarize its value range
    Profile(ProfileArgs),
    /// Build a standard profile from a metric definition sheet
    Define(DefineArgs),
    /// Profile a CSV file and pair each column with a stored standard profile
    Pair(PairArgs),
    /// Render a stored profile report as a table
    Show(ShowArgs),
}

/// Options shared by commands that run the classifier.
#[derive(Debug, Args)]
pub struct ProfilerOptions {
    /// YAML file overriding classifier thresholds and date patterns
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Seed for date sampling; repeated runs with the same seed match exactly
    #[arg(long)]
    pub seed: Option<u64>,
    /// How list-literal columns decide their element type
    #[arg(long = "list-detection", value_enum)]
    pub list_detection: Option<ListDetection>,
}

#[derive(Debug, Args)]
pub struct InputOptions {
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Input CSV file to profile ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Report destination (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Report format (defaults from the output extension, else csv)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    /// Print the report as a table instead of writing it
    #[arg(long)]
    pub table: bool,
    #[command(flatten)]
    pub profiler: ProfilerOptions,
    #[command(flatten)]
    pub input_options: InputOptions,
}

#[derive(Debug, Args)]
pub struct DefineArgs {
    /// Metric definition sheet with 字段名 and 统一指标类型 columns
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Standard profile destination (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Report format (defaults from the output extension, else csv)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    #[command(flatten)]
    pub input_options: InputOptions,
}

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Input CSV file to profile
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Stored standard profile (.csv with column_name,info or .json)
    #[arg(short = 's', long = "standard")]
    pub standard: PathBuf,
    /// Payload JSON destination (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Exit with an error when a profiled column has no standard entry
    #[arg(long = "require-all")]
    pub require_all: bool,
    #[command(flatten)]
    pub profiler: ProfilerOptions,
    #[command(flatten)]
    pub input_options: InputOptions,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Stored profile report (.csv or .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
