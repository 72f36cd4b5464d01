use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    dates::{DatePatternSet, DatePatternSpec, default_pattern_specs},
    error::ProfileResult,
};

pub const DEFAULT_DATE_SAMPLE_SIZE: usize = 100;
pub const DEFAULT_DATE_RATIO_THRESHOLD: f64 = 0.8;
pub const DEFAULT_TEXT_CATEGORY_LIMIT: usize = 5;
pub const DEFAULT_INT_CATEGORY_LIMIT: usize = 10;

/// How the element type of a list-literal column is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ListDetection {
    /// Inspect only the first non-null value. Columns whose rows mix list
    /// shapes are labelled by whatever the first row holds.
    #[default]
    FirstValue,
    /// Union element kinds across every parseable list in the column.
    FullScan,
}

/// Tunables of the classifier, as read from a YAML config file. Every key is
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilerSettings {
    pub date_sample_size: usize,
    pub date_ratio_threshold: f64,
    pub text_category_limit: usize,
    pub int_category_limit: usize,
    pub list_detection: ListDetection,
    pub seed: Option<u64>,
    pub date_patterns: Vec<DatePatternSpec>,
}

impl Default for ProfilerSettings {
    fn default() -> Self {
        Self {
            date_sample_size: DEFAULT_DATE_SAMPLE_SIZE,
            date_ratio_threshold: DEFAULT_DATE_RATIO_THRESHOLD,
            text_category_limit: DEFAULT_TEXT_CATEGORY_LIMIT,
            int_category_limit: DEFAULT_INT_CATEGORY_LIMIT,
            list_detection: ListDetection::default(),
            seed: None,
            date_patterns: default_pattern_specs(),
        }
    }
}

impl ProfilerSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let settings = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing profiler config {path:?}"))?;
        Ok(settings)
    }

    pub fn into_config(self) -> ProfileResult<ProfilerConfig> {
        let date_patterns = DatePatternSet::compile(&self.date_patterns)?;
        Ok(ProfilerConfig {
            date_sample_size: self.date_sample_size.max(1),
            date_ratio_threshold: self.date_ratio_threshold,
            text_category_limit: self.text_category_limit,
            int_category_limit: self.int_category_limit,
            list_detection: self.list_detection,
            seed: self.seed,
            date_patterns,
        })
    }
}

/// Immutable configuration injected into the classifier and summarizer.
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    pub date_sample_size: usize,
    pub date_ratio_threshold: f64,
    pub text_category_limit: usize,
    pub int_category_limit: usize,
    pub list_detection: ListDetection,
    pub seed: Option<u64>,
    pub date_patterns: DatePatternSet,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            date_sample_size: DEFAULT_DATE_SAMPLE_SIZE,
            date_ratio_threshold: DEFAULT_DATE_RATIO_THRESHOLD,
            text_category_limit: DEFAULT_TEXT_CATEGORY_LIMIT,
            int_category_limit: DEFAULT_INT_CATEGORY_LIMIT,
            list_detection: ListDetection::default(),
            seed: None,
            date_patterns: DatePatternSet::default(),
        }
    }
}

impl ProfilerConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_list_detection(mut self, mode: ListDetection) -> Self {
        self.list_detection = mode;
        self
    }

    pub fn with_date_patterns(mut self, patterns: DatePatternSet) -> Self {
        self.date_patterns = patterns;
        self
    }
}
