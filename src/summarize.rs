//! Type-specific value-range statistics.
//!
//! [`Stats`] serializes to a flat JSON object whose keys depend on the column
//! type, e.g. `{"null_count":0,"null_percentage":0.0,"min":1.0,...}`. Values
//! that fail to parse inside a branch degrade that branch to an explicit
//! placeholder and never abort profiling.

use chrono::NaiveDateTime;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::ProfilerConfig,
    frame::{CellValue, Column},
    label::TypeLabel,
    list_literal::{ListElement, looks_like_list, parse_list},
};

pub const NOT_APPLICABLE: &str = "not applicable";
pub const UNABLE_TO_PARSE: &str = "unable to parse";
pub const UNABLE_TO_PARSE_DATES: &str = "unable to parse dates";
pub const EMPTY_RANGE: &str = "empty";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NullStats {
    pub null_count: usize,
    pub null_percentage: f64,
}

impl NullStats {
    pub fn of(column: &Column) -> Self {
        let null_count = column.null_count();
        let null_percentage = if column.is_empty() {
            0.0
        } else {
            round2(null_count as f64 / column.len() as f64 * 100.0)
        };
        Self {
            null_count,
            null_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValues {
    Integers(Vec<i64>),
    Labels(Vec<String>),
    /// Carries [`UNABLE_TO_PARSE`].
    Unparsable(String),
}

impl CategoryValues {
    pub fn len(&self) -> usize {
        match self {
            CategoryValues::Integers(values) => values.len(),
            CategoryValues::Labels(values) => values.len(),
            CategoryValues::Unparsable(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stats {
    Numeric {
        #[serde(flatten)]
        nulls: NullStats,
        min: f64,
        max: f64,
        mean: f64,
        median: f64,
    },
    ListFloat {
        #[serde(flatten)]
        nulls: NullStats,
        min: f64,
        max: f64,
        avg_list_length: f64,
    },
    Categories {
        #[serde(flatten)]
        nulls: NullStats,
        category_values: CategoryValues,
        #[serde(default)]
        category_count: usize,
    },
    Date {
        #[serde(flatten)]
        nulls: NullStats,
        min_date: String,
        max_date: String,
        date_range_days: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date_format: Option<String>,
    },
    DateUnparsable {
        #[serde(flatten)]
        nulls: NullStats,
        date_info: String,
    },
    NotApplicable {
        #[serde(flatten)]
        nulls: NullStats,
        description: String,
    },
    Unparsable {
        #[serde(flatten)]
        nulls: NullStats,
        range: String,
    },
    Empty {
        range: String,
    },
    /// Null counts alone. Legacy checkers wrote this when a date, list or
    /// category branch had nothing to report. Must stay the last variant.
    NullsOnly {
        #[serde(flatten)]
        nulls: NullStats,
    },
}

impl Stats {
    pub fn empty() -> Self {
        Stats::Empty {
            range: EMPTY_RANGE.to_string(),
        }
    }

    pub fn not_applicable(nulls: NullStats) -> Self {
        Stats::NotApplicable {
            nulls,
            description: NOT_APPLICABLE.to_string(),
        }
    }

    pub fn unparsable(nulls: NullStats) -> Self {
        Stats::Unparsable {
            nulls,
            range: UNABLE_TO_PARSE.to_string(),
        }
    }

    pub fn categories(nulls: NullStats, category_values: CategoryValues) -> Self {
        Stats::Categories {
            nulls,
            category_count: category_values.len(),
            category_values,
        }
    }

    pub fn null_stats(&self) -> Option<&NullStats> {
        match self {
            Stats::Numeric { nulls, .. }
            | Stats::ListFloat { nulls, .. }
            | Stats::Categories { nulls, .. }
            | Stats::Date { nulls, .. }
            | Stats::DateUnparsable { nulls, .. }
            | Stats::NotApplicable { nulls, .. }
            | Stats::Unparsable { nulls, .. }
            | Stats::NullsOnly { nulls } => Some(nulls),
            Stats::Empty { .. } => None,
        }
    }

    pub fn category_values(&self) -> Option<&CategoryValues> {
        match self {
            Stats::Categories {
                category_values, ..
            } => Some(category_values),
            _ => None,
        }
    }

    /// One-line rendering used by the `show` command.
    pub fn brief(&self) -> String {
        match self {
            Stats::Numeric {
                min,
                max,
                mean,
                median,
                ..
            } => format!("min={min} max={max} mean={mean:.4} median={median}"),
            Stats::ListFloat {
                min,
                max,
                avg_list_length,
                ..
            } => format!("min={min} max={max} avg_len={avg_list_length:.2}"),
            Stats::Categories {
                category_values,
                category_count,
                ..
            } => {
                let values = match category_values {
                    CategoryValues::Integers(values) => values.iter().join(", "),
                    CategoryValues::Labels(values) => values.join(", "),
                    CategoryValues::Unparsable(message) => message.clone(),
                };
                format!("{category_count} value(s): {values}")
            }
            Stats::Date {
                min_date,
                max_date,
                date_range_days,
                date_format,
                ..
            } => format!(
                "{min_date} .. {max_date} ({date_range_days} days, {})",
                date_format.as_deref().unwrap_or("unknown format")
            ),
            Stats::DateUnparsable { date_info, .. } => date_info.clone(),
            Stats::NotApplicable { description, .. } => description.clone(),
            Stats::Unparsable { range, .. } | Stats::Empty { range } => range.clone(),
            Stats::NullsOnly { nulls } => format!("{} null(s)", nulls.null_count),
        }
    }
}

pub struct RangeSummarizer<'c> {
    config: &'c ProfilerConfig,
}

impl<'c> RangeSummarizer<'c> {
    pub fn new(config: &'c ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn summarize(&self, column: &Column, label: TypeLabel) -> Stats {
        let values = column.non_null().collect::<Vec<_>>();
        if values.is_empty() || label == TypeLabel::Unknown {
            return Stats::empty();
        }
        let nulls = NullStats::of(column);
        match label {
            TypeLabel::Int | TypeLabel::Float => numeric_stats(nulls, &values),
            TypeLabel::Text => Stats::not_applicable(nulls),
            TypeLabel::CategoryText => {
                let labels = values
                    .iter()
                    .map(|value| value.to_string())
                    .sorted()
                    .dedup()
                    .collect();
                Stats::categories(nulls, CategoryValues::Labels(labels))
            }
            TypeLabel::CategoryInt => {
                let integers = values
                    .iter()
                    .filter_map(|value| value.to_number())
                    .map(|number| number as i64)
                    .sorted()
                    .dedup()
                    .collect();
                Stats::categories(nulls, CategoryValues::Integers(integers))
            }
            TypeLabel::Date => self.date_stats(nulls, &values),
            TypeLabel::CategoryListInt => list_category_stats(&column.name, nulls, &values),
            TypeLabel::ListFloat => list_float_stats(&column.name, nulls, &values),
            TypeLabel::ListMixed => Stats::unparsable(nulls),
            TypeLabel::Unknown => Stats::empty(),
        }
    }

    fn date_stats(&self, nulls: NullStats, values: &[&CellValue]) -> Stats {
        let patterns = &self.config.date_patterns;
        let parsed = values
            .iter()
            .filter_map(|value| value.as_text())
            .filter_map(|text| patterns.parse(text))
            .collect::<Vec<NaiveDateTime>>();
        let (Some(min), Some(max)) = (parsed.iter().min(), parsed.iter().max()) else {
            return Stats::DateUnparsable {
                nulls,
                date_info: UNABLE_TO_PARSE_DATES.to_string(),
            };
        };
        let date_format = values
            .first()
            .and_then(|value| value.as_text())
            .and_then(|first| patterns.format_label(first))
            .map(str::to_string);
        Stats::Date {
            nulls,
            min_date: min.format("%Y-%m-%d").to_string(),
            max_date: max.format("%Y-%m-%d").to_string(),
            date_range_days: (*max - *min).num_days(),
            date_format,
        }
    }
}

fn numeric_stats(nulls: NullStats, values: &[&CellValue]) -> Stats {
    let mut numbers = values
        .iter()
        .filter_map(|value| value.to_number())
        .collect::<Vec<_>>();
    if numbers.is_empty() {
        return Stats::unparsable(nulls);
    }
    numbers.sort_by(f64::total_cmp);
    let count = numbers.len();
    let mean = numbers.iter().sum::<f64>() / count as f64;
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (numbers[mid - 1] + numbers[mid]) / 2.0
    } else {
        numbers[mid]
    };
    Stats::Numeric {
        nulls,
        min: numbers[0],
        max: numbers[count - 1],
        mean,
        median,
    }
}

/// Parses every bracketed text value, skipping rows that do not parse.
fn parsed_lists(column_name: &str, values: &[&CellValue]) -> Vec<Vec<ListElement>> {
    values
        .iter()
        .filter_map(|value| value.as_text())
        .filter(|text| looks_like_list(text))
        .filter_map(|text| match parse_list(text) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!(
                    "Skipping malformed list '{text}' in column '{column_name}': {} at {}",
                    err.message, err.position
                );
                None
            }
        })
        .collect()
}

fn list_category_stats(column_name: &str, nulls: NullStats, values: &[&CellValue]) -> Stats {
    let lists = parsed_lists(column_name, values);
    let integers = lists
        .iter()
        .flatten()
        .map(|element| match element {
            ListElement::Int(i) => Some(*i),
            _ => None,
        })
        .collect::<Option<Vec<_>>>();
    match integers {
        Some(integers) => {
            let integers = integers.into_iter().sorted().dedup().collect();
            Stats::categories(nulls, CategoryValues::Integers(integers))
        }
        None => Stats::Categories {
            nulls,
            category_values: CategoryValues::Unparsable(UNABLE_TO_PARSE.to_string()),
            category_count: 0,
        },
    }
}

fn list_float_stats(column_name: &str, nulls: NullStats, values: &[&CellValue]) -> Stats {
    let lists = parsed_lists(column_name, values);
    let numbers = lists
        .iter()
        .flatten()
        .map(ListElement::as_number)
        .collect::<Option<Vec<_>>>();
    let Some(numbers) = numbers.filter(|numbers| !numbers.is_empty()) else {
        return Stats::unparsable(nulls);
    };
    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let total_length = lists.iter().map(Vec::len).sum::<usize>();
    Stats::ListFloat {
        nulls,
        min,
        max,
        avg_list_length: total_length as f64 / lists.len() as f64,
    }
}

/// Rounds to two decimals with ties going to the even digit, so an exact
/// `0.125` becomes `0.12`.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
