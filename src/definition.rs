//! Standard profiles authored from a metric definition sheet.
//!
//! The sheet declares, per field, a type and an optional value-range string
//! such as `[男:1,女:2]` or `[已打印, 暂存]`. Normalization produces the same
//! report shape the profiler emits, with zero-filled statistics in place of
//! computed ones. Categorical ranges are parsed into real category values.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info};

use crate::{
    error::{ProfileError, ProfileResult},
    frame::is_null_token,
    io_utils,
    label::{DataType, TypeLabel},
    profile::{Info, ProfileReport, ProfileRow},
    summarize::{CategoryValues, NullStats, Stats},
};

pub const METRIC_CODE: &str = "指标编码";
pub const METRIC_VERSION: &str = "指标版本";
pub const METRIC_NAME: &str = "指标名";
pub const FIELD_NAME: &str = "字段名";
pub const DECLARED_TYPE: &str = "统一指标类型";
pub const VALUE_RANGE: &str = "取值范围";

const INT_TYPES: &[&str] = &["int", "integer", "bigint"];
const FLOAT_TYPES: &[&str] = &["float", "double", "decimal", "numeric"];
const TEXT_TYPES: &[&str] = &["text", "string", "varchar", "char"];

/// Raw rows of a metric definition sheet, keyed by header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionSheet {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl DefinitionSheet {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    pub fn load(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading headers from {path:?}"))?
            .into_iter()
            .map(|header| header.trim().to_string())
            .collect::<Vec<_>>();
        let mut records = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            records.push(
                io_utils::decode_record(&record, encoding)
                    .with_context(|| format!("Decoding row {}", row_idx + 2))?,
            );
        }
        Ok(Self { headers, records })
    }

    fn header_index(&self) -> HashMap<&str, usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.as_str(), idx))
            .collect()
    }

    pub fn rows(&self) -> ProfileResult<Vec<MetricDefinitionRow>> {
        let index = self.header_index();
        let missing = [FIELD_NAME, DECLARED_TYPE]
            .into_iter()
            .filter(|required| !index.contains_key(required))
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ProfileError::MissingColumns(missing));
        }
        let cell = |record: &Vec<String>, header: &str| -> Option<String> {
            index
                .get(header)
                .and_then(|&idx| record.get(idx))
                .map(|raw| raw.trim())
                .filter(|trimmed| !is_null_token(trimmed))
                .map(str::to_string)
        };
        Ok(self
            .records
            .iter()
            .map(|record| MetricDefinitionRow {
                metric_code: cell(record, METRIC_CODE),
                metric_version: cell(record, METRIC_VERSION),
                metric_name: cell(record, METRIC_NAME),
                field_name: cell(record, FIELD_NAME).unwrap_or_default(),
                declared_type: cell(record, DECLARED_TYPE),
                value_range: cell(record, VALUE_RANGE),
            })
            .collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricDefinitionRow {
    pub metric_code: Option<String>,
    pub metric_version: Option<String>,
    pub metric_name: Option<String>,
    pub field_name: String,
    pub declared_type: Option<String>,
    pub value_range: Option<String>,
}

impl MetricDefinitionRow {
    /// A declared range denotes categories when it is bracketed or
    /// comma-separated.
    pub fn is_category(&self) -> bool {
        self.value_range.as_deref().is_some_and(|range| {
            !range.is_empty() && ((range.contains('[') && range.contains(']')) || range.contains(','))
        })
    }

    pub fn resolved_type(&self) -> Option<String> {
        let declared = self.declared_type.as_deref()?.trim();
        if declared.is_empty() {
            return None;
        }
        let lower = declared.to_lowercase();
        if !self.is_category() || lower.starts_with("list") || lower.starts_with("category") {
            return Some(declared.to_string());
        }
        Some(if INT_TYPES.contains(&lower.as_str()) {
            TypeLabel::CategoryInt.as_str().to_string()
        } else if TEXT_TYPES.contains(&lower.as_str()) {
            TypeLabel::CategoryText.as_str().to_string()
        } else {
            format!("category_{declared}")
        })
    }

    pub fn to_info(&self) -> Info {
        let (data_type, value_range) = match self.resolved_type() {
            None => (DataType::Label(TypeLabel::Unknown), Stats::empty()),
            Some(resolved) => {
                let stats = self.placeholder_stats(&resolved);
                (DataType::parse(&resolved), stats)
            }
        };
        Info {
            data_type,
            value_range,
            real_name: self.metric_name.clone(),
        }
    }

    fn placeholder_stats(&self, resolved: &str) -> Stats {
        let nulls = NullStats::default();
        let lower = resolved.to_lowercase();
        let range = self.value_range.as_deref().unwrap_or_default();
        if lower == TypeLabel::Unknown.as_str() {
            Stats::empty()
        } else if INT_TYPES.contains(&lower.as_str()) || FLOAT_TYPES.contains(&lower.as_str()) {
            Stats::Numeric {
                nulls,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                median: 0.0,
            }
        } else if TEXT_TYPES.contains(&lower.as_str()) {
            Stats::not_applicable(nulls)
        } else if lower.starts_with("category_") {
            let prefer_integers = lower == TypeLabel::CategoryInt.as_str()
                || lower == TypeLabel::CategoryListInt.as_str();
            Stats::categories(nulls, declared_categories(range, prefer_integers))
        } else if lower.contains("date") || lower.contains("time") {
            let declared = self.declared_type.as_deref().unwrap_or(resolved);
            Stats::Date {
                nulls,
                min_date: String::new(),
                max_date: String::new(),
                date_range_days: 0,
                date_format: Some(date_format_for_declared(declared).to_string()),
            }
        } else if lower.starts_with("list[int]") || lower.starts_with("array[int]") {
            Stats::categories(nulls, declared_categories(range, true))
        } else if lower.starts_with("list[float]") || lower.starts_with("array[float]") {
            Stats::ListFloat {
                nulls,
                min: 0.0,
                max: 0.0,
                avg_list_length: 0.0,
            }
        } else if lower.starts_with("list") || lower.starts_with("array") {
            Stats::unparsable(nulls)
        } else {
            Stats::not_applicable(nulls)
        }
    }
}

/// Value half of a `label:value` category pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CategoryValue {
    fn parse(raw: &str) -> Self {
        if raw.contains('.') {
            raw.parse::<f64>()
                .map_or_else(|_| CategoryValue::Text(raw.to_string()), CategoryValue::Float)
        } else {
            raw.parse::<i64>()
                .map_or_else(|_| CategoryValue::Text(raw.to_string()), CategoryValue::Int)
        }
    }
}

/// Parses a declared value range into `(label, value)` pairs.
///
/// `[男:1,女:2]` yields labelled values; `[已打印, 暂存]` uses each bare token
/// as both label and value. A later duplicate label replaces the earlier one.
pub fn parse_category_values(range: &str) -> Vec<(String, CategoryValue)> {
    let trimmed = range.trim();
    let trimmed = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(']').unwrap_or(trimmed);
    let pieces = trimmed.split(',').collect::<Vec<_>>();
    let mut parsed: Vec<(String, CategoryValue)> = Vec::new();
    let mut push = |label: String, value: CategoryValue| {
        match parsed.iter_mut().find(|(existing, _)| *existing == label) {
            Some(slot) => slot.1 = value,
            None => parsed.push((label, value)),
        }
    };
    if pieces.iter().any(|piece| piece.contains(':')) {
        for (label, value) in pieces.iter().filter_map(|piece| piece.split_once(':')) {
            push(label.trim().to_string(), CategoryValue::parse(value.trim()));
        }
    } else {
        for token in pieces.iter().map(|piece| piece.trim()).filter(|t| !t.is_empty()) {
            push(token.to_string(), CategoryValue::Text(token.to_string()));
        }
    }
    parsed
}

/// Sorted distinct category values for a declared range. Integer values win
/// when requested and present, labels otherwise.
pub fn declared_categories(range: &str, prefer_integers: bool) -> CategoryValues {
    let parsed = parse_category_values(range);
    let integers = parsed
        .iter()
        .filter_map(|(_, value)| match value {
            CategoryValue::Int(i) => Some(*i),
            _ => None,
        })
        .sorted()
        .dedup()
        .collect::<Vec<_>>();
    if prefer_integers && !integers.is_empty() {
        CategoryValues::Integers(integers)
    } else {
        CategoryValues::Labels(
            parsed
                .into_iter()
                .map(|(label, _)| label)
                .sorted()
                .dedup()
                .collect(),
        )
    }
}

pub fn date_format_for_declared(declared: &str) -> &'static str {
    let lower = declared.to_lowercase();
    // "time" is tested before "date", so `timestamp` and `date_time` read as times.
    if lower.contains("yyyy-mm-dd hh:mm:ss") || lower.contains("datetime") {
        "YYYY-MM-DD HH:MM:SS"
    } else if lower.contains("yyyy-mm-dd") {
        "YYYY-MM-DD"
    } else if lower.contains("hh:mm:ss") || lower.contains("time") {
        "HH:MM:SS"
    } else {
        "YYYY-MM-DD"
    }
}

/// Converts a definition sheet into a standard profile, one row per record.
pub fn normalize(sheet: &DefinitionSheet) -> ProfileResult<ProfileReport> {
    let rows = sheet
        .rows()?
        .iter()
        .map(|row| {
            let info = row.to_info();
            debug!(
                "Field '{}' declared as {:?} resolved to {}",
                row.field_name, row.declared_type, info.data_type
            );
            ProfileRow {
                column_name: row.field_name.clone(),
                info,
            }
        })
        .collect::<Vec<_>>();
    info!("Normalized {} metric definition(s)", rows.len());
    Ok(ProfileReport::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet(rows: &[[&str; 4]]) -> DefinitionSheet {
        DefinitionSheet::new(
            [METRIC_NAME, FIELD_NAME, DECLARED_TYPE, VALUE_RANGE]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn single(row: [&str; 4]) -> Info {
        let report = normalize(&sheet(&[row])).expect("normalize");
        report.rows[0].info.clone()
    }

    #[test]
    fn labelled_int_categories_use_their_values() {
        let info = single(["性别", "gender", "int", "[男:1,女:2]"]);
        assert_eq!(info.data_type, DataType::Label(TypeLabel::CategoryInt));
        assert_eq!(info.real_name.as_deref(), Some("性别"));
        assert_eq!(
            serde_json::to_value(&info.value_range).unwrap(),
            json!({
                "null_count": 0,
                "null_percentage": 0.0,
                "category_values": [1, 2],
                "category_count": 2
            })
        );
    }

    #[test]
    fn bare_tokens_become_text_categories() {
        let info = single(["状态", "status", "varchar", "[已打印, 暂存]"]);
        assert_eq!(info.data_type, DataType::Label(TypeLabel::CategoryText));
        assert_eq!(
            info.value_range.category_values(),
            Some(&CategoryValues::Labels(vec!["已打印".into(), "暂存".into()]))
        );
    }

    #[test]
    fn other_categorical_types_are_prefixed() {
        let info = single(["", "level", "enum", "low, high"]);
        assert_eq!(
            info.data_type,
            DataType::Declared("category_enum".to_string())
        );
        assert_eq!(info.real_name, None);
        assert_eq!(
            info.value_range.category_values(),
            Some(&CategoryValues::Labels(vec!["high".into(), "low".into()]))
        );
    }

    #[test]
    fn declared_types_without_ranges_get_zeroed_placeholders() {
        let info = single(["年龄", "age", "Integer", ""]);
        assert_eq!(info.data_type, DataType::Declared("Integer".to_string()));
        assert_eq!(
            serde_json::to_value(&info.value_range).unwrap(),
            json!({
                "null_count": 0,
                "null_percentage": 0.0,
                "min": 0.0,
                "max": 0.0,
                "mean": 0.0,
                "median": 0.0
            })
        );

        let text = single(["备注", "note", "text", ""]);
        assert_eq!(text.value_range, Stats::not_applicable(NullStats::default()));

        let floats = single(["", "readings", "list[float]", ""]);
        assert!(matches!(floats.value_range, Stats::ListFloat { .. }));

        let mixed = single(["", "tags", "array[string]", ""]);
        assert_eq!(mixed.value_range, Stats::unparsable(NullStats::default()));

        let other = single(["", "blob", "binary", ""]);
        assert_eq!(other.value_range, Stats::not_applicable(NullStats::default()));
    }

    #[test]
    fn date_placeholders_carry_declared_format() {
        let info = single(["就诊时间", "visit_at", "datetime", ""]);
        assert_eq!(
            serde_json::to_value(&info.value_range).unwrap(),
            json!({
                "null_count": 0,
                "null_percentage": 0.0,
                "min_date": "",
                "max_date": "",
                "date_range_days": 0,
                "date_format": "YYYY-MM-DD HH:MM:SS"
            })
        );
        assert_eq!(date_format_for_declared("date"), "YYYY-MM-DD");
        assert_eq!(date_format_for_declared("time"), "HH:MM:SS");
        assert_eq!(date_format_for_declared("Timestamp"), "HH:MM:SS");
        assert_eq!(date_format_for_declared("date_time"), "HH:MM:SS");
        assert_eq!(date_format_for_declared("yyyy-mm-dd"), "YYYY-MM-DD");
        assert_eq!(
            date_format_for_declared("DateTime(yyyy-mm-dd hh:mm:ss)"),
            "YYYY-MM-DD HH:MM:SS"
        );
    }

    #[test]
    fn list_int_declarations_parse_their_range() {
        let info = single(["", "codes", "list[int]", "[a:3,b:1,c:3]"]);
        assert_eq!(
            info.value_range.category_values(),
            Some(&CategoryValues::Integers(vec![1, 3]))
        );
    }

    #[test]
    fn missing_declared_type_is_unknown() {
        let info = single(["", "ghost", "", ""]);
        assert_eq!(info.data_type, DataType::Label(TypeLabel::Unknown));
        assert_eq!(info.value_range, Stats::empty());
    }

    #[test]
    fn missing_required_headers_are_reported() {
        let sheet = DefinitionSheet::new(
            vec![METRIC_NAME.to_string(), VALUE_RANGE.to_string()],
            Vec::new(),
        );
        match normalize(&sheet) {
            Err(ProfileError::MissingColumns(missing)) => {
                assert_eq!(missing, vec![FIELD_NAME.to_string(), DECLARED_TYPE.to_string()]);
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn category_grammar_handles_mixed_values() {
        let parsed = parse_category_values("[低:0.5, 中:2, 高:high]");
        assert_eq!(
            parsed,
            vec![
                ("低".to_string(), CategoryValue::Float(0.5)),
                ("中".to_string(), CategoryValue::Int(2)),
                ("高".to_string(), CategoryValue::Text("high".to_string())),
            ]
        );
        assert!(parse_category_values("[]").is_empty());
    }
}
