use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    classify::TypeClassifier,
    config::ProfilerConfig,
    frame::{Column, Table},
    label::DataType,
    sampler::{RandomSampler, Sampler},
    summarize::{RangeSummarizer, Stats},
};

/// Type and value-range description of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub data_type: DataType,
    pub value_range: Stats,
    /// Human-readable metric name, only known for rows authored in a metric
    /// definition sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub column_name: String,
    pub info: Info,
}

/// One row per column, in input column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileReport {
    pub rows: Vec<ProfileRow>,
}

impl ProfileReport {
    pub fn new(rows: Vec<ProfileRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, column_name: &str) -> Option<&Info> {
        self.rows
            .iter()
            .find(|row| row.column_name == column_name)
            .map(|row| &row.info)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.column_name.as_str())
    }
}

pub struct ColumnProfiler<'c> {
    config: &'c ProfilerConfig,
}

impl<'c> ColumnProfiler<'c> {
    pub fn new(config: &'c ProfilerConfig) -> Self {
        Self { config }
    }

    /// Profiles every column with a sampler freshly seeded from the config,
    /// so repeated calls with a configured seed produce identical reports.
    pub fn profile(&self, table: &Table) -> ProfileReport {
        let mut sampler = RandomSampler::new(self.config.seed);
        self.profile_with(table, &mut sampler)
    }

    pub fn profile_with(&self, table: &Table, sampler: &mut dyn Sampler) -> ProfileReport {
        let rows = table
            .columns
            .iter()
            .map(|column| ProfileRow {
                column_name: column.name.clone(),
                info: self.profile_column(column, sampler),
            })
            .collect::<Vec<_>>();
        info!(
            "Profiled {} column(s) across {} row(s)",
            rows.len(),
            table.row_count()
        );
        ProfileReport::new(rows)
    }

    pub fn profile_column(&self, column: &Column, sampler: &mut dyn Sampler) -> Info {
        let label = TypeClassifier::new(self.config).classify(column, sampler);
        let value_range = RangeSummarizer::new(self.config).summarize(column, label);
        debug!(
            "Column '{}': {} non-null of {} value(s)",
            column.name,
            column.len() - column.null_count(),
            column.len()
        );
        Info {
            data_type: label.into(),
            value_range,
            real_name: None,
        }
    }
}
