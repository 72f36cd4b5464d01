pub mod classify;
pub mod cli;
pub mod config;
pub mod dates;
pub mod definition;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod label;
pub mod list_literal;
pub mod pairing;
pub mod profile;
pub mod report;
pub mod sampler;
pub mod summarize;
pub mod table;

use std::{env, io::Write, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputOptions, ProfilerOptions},
    config::{ProfilerConfig, ProfilerSettings},
    definition::DefinitionSheet,
    frame::Table,
    profile::{ColumnProfiler, ProfileReport},
    report::ReportFormat,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_profiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Define(args) => handle_define(&args),
        Commands::Pair(args) => handle_pair(&args),
        Commands::Show(args) => handle_show(&args),
    }
}

/// Resolves the classifier configuration: YAML file first, then flag
/// overrides.
pub fn build_config(options: &ProfilerOptions) -> Result<ProfilerConfig> {
    let mut settings = match &options.config {
        Some(path) => ProfilerSettings::load(path)?,
        None => ProfilerSettings::default(),
    };
    if let Some(seed) = options.seed {
        settings.seed = Some(seed);
    }
    if let Some(mode) = options.list_detection {
        settings.list_detection = mode;
    }
    debug!("Profiler settings: {settings:?}");
    settings
        .into_config()
        .context("Compiling profiler configuration")
}

fn load_input(input: &Path, options: &InputOptions) -> Result<Table> {
    let delimiter = io_utils::resolve_input_delimiter(input, options.delimiter);
    let encoding = io_utils::resolve_encoding(options.input_encoding.as_deref())?;
    info!(
        "Loading '{}' with delimiter '{}' and encoding {}",
        input.display(),
        printable_delimiter(delimiter),
        encoding.name()
    );
    frame::load_table(input, delimiter, encoding)
        .with_context(|| format!("Loading table from {input:?}"))
}

fn output_format(requested: Option<ReportFormat>, output: Option<&Path>) -> ReportFormat {
    requested
        .or_else(|| output.map(ReportFormat::from_path))
        .unwrap_or_default()
}

fn write_report(report: &ProfileReport, output: Option<&Path>, format: ReportFormat) -> Result<()> {
    report::save_report(report, output, format)?;
    if let Some(path) = output {
        info!(
            "Report for {} column(s) written to {:?}",
            report.len(),
            path
        );
    }
    Ok(())
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let config = build_config(&args.profiler)?;
    let data = load_input(&args.input, &args.input_options)?;
    let report = ColumnProfiler::new(&config).profile(&data);
    if args.table {
        table::print_report(&report);
        return Ok(());
    }
    let output = args.output.as_deref();
    write_report(&report, output, output_format(args.format, output))
}

fn handle_define(args: &cli::DefineArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.input_options.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_options.input_encoding.as_deref())?;
    let sheet = DefinitionSheet::load(&args.input, delimiter, encoding)
        .with_context(|| format!("Reading metric definitions from {:?}", args.input))?;
    let report = definition::normalize(&sheet)?;
    let output = args.output.as_deref();
    write_report(&report, output, output_format(args.format, output))
}

fn handle_pair(args: &cli::PairArgs) -> Result<()> {
    let config = build_config(&args.profiler)?;
    let standard = report::load_report(&args.standard)
        .with_context(|| format!("Loading standard profile {:?}", args.standard))?;
    let data = load_input(&args.input, &args.input_options)?;
    let profiled = ColumnProfiler::new(&config).profile(&data);
    let pairing = pairing::pair_reports(&profiled, &standard);
    if args.require_all && !pairing.unmatched.is_empty() {
        bail!(
            "No standard profile entry for column(s): {}",
            pairing.unmatched.join(", ")
        );
    }
    let mut output = io_utils::open_output(args.output.as_deref())?;
    serde_json::to_writer_pretty(&mut output, &pairing.payloads)
        .context("Writing judgment payloads")?;
    writeln!(output)?;
    output.flush().context("Flushing payload output")?;
    Ok(())
}

fn handle_show(args: &cli::ShowArgs) -> Result<()> {
    let report = report::load_report(&args.input)
        .with_context(|| format!("Loading report {:?}", args.input))?;
    table::print_report(&report);
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
