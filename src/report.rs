//! Persistence of profile reports.
//!
//! The CSV form has two columns, `column_name` and `info`, with `info` held as
//! compact JSON. Older standard profiles stored `info` with single-quoted
//! keys, so loading retries with quotes swapped before giving up.

use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;

use crate::{
    error::{ProfileError, ProfileResult},
    io_utils,
    profile::{Info, ProfileReport, ProfileRow},
};

pub const COLUMN_NAME_HEADER: &str = "column_name";
pub const INFO_HEADER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    /// `.json` paths read and write JSON, everything else CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

pub fn save_report(report: &ProfileReport, path: Option<&Path>, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(path)?;
            writer.write_record([COLUMN_NAME_HEADER, INFO_HEADER])?;
            for row in &report.rows {
                let info = serde_json::to_string(&row.info)
                    .with_context(|| format!("Serializing info for column '{}'", row.column_name))?;
                writer.write_record([row.column_name.as_str(), info.as_str()])?;
            }
            writer.flush().context("Flushing report output")?;
        }
        ReportFormat::Json => {
            let mut output = io_utils::open_output(path)?;
            serde_json::to_writer_pretty(&mut output, report).context("Writing JSON report")?;
            writeln!(output)?;
            output.flush().context("Flushing report output")?;
        }
    }
    Ok(())
}

pub fn load_report(path: &Path) -> Result<ProfileReport> {
    if ReportFormat::from_path(path) == ReportFormat::Json {
        let file = File::open(path).with_context(|| format!("Opening report {path:?}"))?;
        let report = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing JSON report {path:?}"))?;
        return Ok(report);
    }
    let delimiter = io_utils::resolve_input_delimiter(path, None);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader, encoding_rs::UTF_8)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        records.push(
            io_utils::decode_record(&record, encoding_rs::UTF_8)
                .with_context(|| format!("Decoding row {}", row_idx + 2))?,
        );
    }
    let report = report_from_records(&headers, &records)
        .with_context(|| format!("Loading report {path:?}"))?;
    Ok(report)
}

pub fn report_from_records(headers: &[String], records: &[Vec<String>]) -> ProfileResult<ProfileReport> {
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(name_idx), Some(info_idx)) = (position(COLUMN_NAME_HEADER), position(INFO_HEADER))
    else {
        let missing = [COLUMN_NAME_HEADER, INFO_HEADER]
            .into_iter()
            .filter(|&name| position(name).is_none())
            .map(str::to_string)
            .collect();
        return Err(ProfileError::MissingColumns(missing));
    };
    let rows = records
        .iter()
        .filter(|record| record.iter().any(|cell| !cell.trim().is_empty()))
        .map(|record| {
            let column_name = record.get(name_idx).map_or("", |c| c.trim()).to_string();
            let raw = record.get(info_idx).map_or("", String::as_str);
            parse_info(&column_name, raw).map(|info| ProfileRow { column_name, info })
        })
        .collect::<ProfileResult<Vec<_>>>()?;
    Ok(ProfileReport::new(rows))
}

/// Parses a stored `info` cell, retrying dict-style cells with single quotes
/// swapped for double quotes.
pub fn parse_info(column: &str, raw: &str) -> ProfileResult<Info> {
    match serde_json::from_str(raw) {
        Ok(info) => Ok(info),
        Err(_) if raw.contains('\'') => {
            debug!("Retrying info for column '{column}' with double quotes");
            serde_json::from_str(&raw.replace('\'', "\"")).map_err(|source| {
                ProfileError::InvalidInfo {
                    column: column.to_string(),
                    source,
                }
            })
        }
        Err(source) => Err(ProfileError::InvalidInfo {
            column: column.to_string(),
            source,
        }),
    }
}
