//! Date recognition rules shared by classification and summarization.
//!
//! A [`DatePatternSet`] is an ordered, immutable list of patterns. Each
//! pattern pairs a regular expression that gates the shape of a value with a
//! calendar parse that rejects impossible dates such as `2023-02-30`, plus the
//! readable label reported as `date_format`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, ProfileResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateParse {
    /// Calendar date parsed with a chrono format string.
    Date { format: String },
    /// Date and time parsed with a chrono format string.
    #[serde(rename = "datetime")]
    DateTime { format: String },
    EpochSeconds,
    EpochMillis,
}

impl DateParse {
    fn apply(&self, value: &str) -> Option<NaiveDateTime> {
        match self {
            DateParse::Date { format } => NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
            DateParse::DateTime { format } => NaiveDateTime::parse_from_str(value, format).ok(),
            DateParse::EpochSeconds => value
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .map(|dt| dt.naive_utc()),
            DateParse::EpochMillis => value
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.naive_utc()),
        }
    }
}

/// Serializable form of a pattern, as written in a profiler config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePatternSpec {
    pub label: String,
    pub regex: String,
    #[serde(flatten)]
    pub parse: DateParse,
}

impl DatePatternSpec {
    fn new(label: &str, regex: &str, parse: DateParse) -> Self {
        Self {
            label: label.to_string(),
            regex: regex.to_string(),
            parse,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatePattern {
    pub label: String,
    regex: Regex,
    parse: DateParse,
}

impl DatePattern {
    pub fn matches_shape(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        if self.matches_shape(value) {
            self.parse.apply(value)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatePatternSet {
    patterns: Vec<DatePattern>,
}

impl DatePatternSet {
    pub fn compile(specs: &[DatePatternSpec]) -> ProfileResult<Self> {
        let patterns = specs
            .iter()
            .map(|spec| {
                let regex =
                    Regex::new(&spec.regex).map_err(|source| ProfileError::InvalidDatePattern {
                        label: spec.label.clone(),
                        source,
                    })?;
                Ok(DatePattern {
                    label: spec.label.clone(),
                    regex,
                    parse: spec.parse.clone(),
                })
            })
            .collect::<ProfileResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    /// Parses with the first pattern whose shape matches and whose calendar
    /// parse succeeds; a shape match with a failed parse moves on to the next
    /// pattern.
    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        self.patterns.iter().find_map(|pattern| pattern.parse(value))
    }

    pub fn is_date(&self, value: &str) -> bool {
        self.parse(value).is_some()
    }

    /// Label of the first pattern whose shape matches, parse or not.
    pub fn format_label(&self, value: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches_shape(value))
            .map(|pattern| pattern.label.as_str())
    }
}

impl Default for DatePatternSet {
    fn default() -> Self {
        Self::compile(&default_pattern_specs()).expect("built-in date patterns compile")
    }
}

pub fn default_pattern_specs() -> Vec<DatePatternSpec> {
    let date = |format: &str| DateParse::Date {
        format: format.to_string(),
    };
    let datetime = |format: &str| DateParse::DateTime {
        format: format.to_string(),
    };
    vec![
        DatePatternSpec::new("YYYY-MM-DD", r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$", date("%Y-%m-%d")),
        DatePatternSpec::new(
            "MM/DD/YYYY",
            r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$",
            date("%m/%d/%Y"),
        ),
        DatePatternSpec::new(
            "DD.MM.YYYY",
            r"^[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{4}$",
            date("%d.%m.%Y"),
        ),
        DatePatternSpec::new(
            "DD-MM-YYYY",
            r"^[0-9]{1,2}-[0-9]{1,2}-[0-9]{4}$",
            date("%d-%m-%Y"),
        ),
        DatePatternSpec::new(
            "YYYY年MM月DD日",
            r"^[0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日$",
            date("%Y年%m月%d日"),
        ),
        DatePatternSpec::new(
            "YYYY-MM-DD HH:MM:SS",
            r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$",
            datetime("%Y-%m-%d %H:%M:%S"),
        ),
        DatePatternSpec::new(
            "YYYY/MM/DD HH:MM:SS",
            r"^[0-9]{4}/[0-9]{2}/[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$",
            datetime("%Y/%m/%d %H:%M:%S"),
        ),
        DatePatternSpec::new("UNIX时间戳(秒)", r"^[0-9]{10}$", DateParse::EpochSeconds),
        DatePatternSpec::new("UNIX时间戳(毫秒)", r"^[0-9]{13}$", DateParse::EpochMillis),
    ]
}
