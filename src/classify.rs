//! Semantic type inference for a single column.
//!
//! Classification is an ordered list of rules evaluated top-down; the first
//! rule that returns a label wins and columns no rule claims are `text`:
//!
//! 1. `empty`: no non-null values → `unknown`
//! 2. `list_literal`: text column whose first value is a bracketed list →
//!    `category_list[int]`, `list[float]` or `list[mixed]`
//! 3. `date_strings`: all-text column where a sample is mostly dates → `date`
//! 4. `low_cardinality_text`: all-text column with few distinct values →
//!    `category_text`
//! 5. `numeric`: every value coerces to a number → `category_int`, `int` or
//!    `float`

use std::collections::HashSet;

use log::debug;

use crate::{
    config::{ListDetection, ProfilerConfig},
    frame::{CellValue, Column},
    label::TypeLabel,
    list_literal::{ElementKinds, looks_like_list, parse_list},
    sampler::Sampler,
};

/// Non-null values of a column plus the storage facts the rules need.
pub(crate) struct ColumnView<'a> {
    values: Vec<&'a CellValue>,
    holds_text: bool,
    all_text: bool,
}

impl<'a> ColumnView<'a> {
    pub(crate) fn new(column: &'a Column) -> Self {
        let values = column.non_null().collect::<Vec<_>>();
        let text_count = values.iter().filter(|v| v.as_text().is_some()).count();
        Self {
            holds_text: text_count > 0,
            all_text: !values.is_empty() && text_count == values.len(),
            values,
        }
    }

    fn texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.values.iter().copied().filter_map(CellValue::as_text)
    }
}

type RuleFn = fn(&TypeClassifier<'_>, &ColumnView<'_>, &mut dyn Sampler) -> Option<TypeLabel>;

struct Rule {
    name: &'static str,
    apply: RuleFn,
}

const RULES: [Rule; 5] = [
    Rule {
        name: "empty",
        apply: empty_rule,
    },
    Rule {
        name: "list_literal",
        apply: list_literal_rule,
    },
    Rule {
        name: "date_strings",
        apply: date_strings_rule,
    },
    Rule {
        name: "low_cardinality_text",
        apply: low_cardinality_text_rule,
    },
    Rule {
        name: "numeric",
        apply: numeric_rule,
    },
];

pub struct TypeClassifier<'c> {
    config: &'c ProfilerConfig,
}

impl<'c> TypeClassifier<'c> {
    pub fn new(config: &'c ProfilerConfig) -> Self {
        Self { config }
    }

    /// Rule names in evaluation order.
    pub fn rule_names() -> Vec<&'static str> {
        RULES.iter().map(|rule| rule.name).collect()
    }

    pub fn classify(&self, column: &Column, sampler: &mut dyn Sampler) -> TypeLabel {
        let view = ColumnView::new(column);
        for rule in &RULES {
            if let Some(label) = (rule.apply)(self, &view, sampler) {
                debug!(
                    "Column '{}' classified as {} by rule '{}'",
                    column.name, label, rule.name
                );
                return label;
            }
        }
        debug!("Column '{}' classified as text by default", column.name);
        TypeLabel::Text
    }
}

fn empty_rule(
    _: &TypeClassifier<'_>,
    view: &ColumnView<'_>,
    _: &mut dyn Sampler,
) -> Option<TypeLabel> {
    view.values.is_empty().then_some(TypeLabel::Unknown)
}

fn list_literal_rule(
    classifier: &TypeClassifier<'_>,
    view: &ColumnView<'_>,
    _: &mut dyn Sampler,
) -> Option<TypeLabel> {
    if !view.holds_text {
        return None;
    }
    let first = view.values.first()?.as_text()?;
    if !looks_like_list(first) {
        return None;
    }
    let elements = parse_list(first).ok()?;
    if elements.is_empty() {
        return None;
    }
    let kinds = match classifier.config.list_detection {
        ListDetection::FirstValue => ElementKinds::of(&elements),
        ListDetection::FullScan => {
            let mut kinds = ElementKinds::default();
            for parsed in view
                .texts()
                .filter(|text| looks_like_list(text))
                .filter_map(|text| parse_list(text).ok())
            {
                kinds.extend(&parsed);
            }
            kinds
        }
    };
    Some(if kinds.only_ints() {
        TypeLabel::CategoryListInt
    } else if kinds.only_floats() {
        TypeLabel::ListFloat
    } else {
        TypeLabel::ListMixed
    })
}

fn date_strings_rule(
    classifier: &TypeClassifier<'_>,
    view: &ColumnView<'_>,
    sampler: &mut dyn Sampler,
) -> Option<TypeLabel> {
    if !view.all_text {
        return None;
    }
    let texts = view.texts().collect::<Vec<_>>();
    let picked = sampler.sample_indices(texts.len(), classifier.config.date_sample_size);
    if picked.is_empty() {
        return None;
    }
    let patterns = &classifier.config.date_patterns;
    let dates = picked
        .iter()
        .filter(|&&idx| patterns.is_date(texts[idx]))
        .count();
    let ratio = dates as f64 / picked.len() as f64;
    (ratio >= classifier.config.date_ratio_threshold).then_some(TypeLabel::Date)
}

fn low_cardinality_text_rule(
    classifier: &TypeClassifier<'_>,
    view: &ColumnView<'_>,
    _: &mut dyn Sampler,
) -> Option<TypeLabel> {
    if !view.all_text {
        return None;
    }
    let distinct = view.texts().collect::<HashSet<_>>().len();
    (distinct < classifier.config.text_category_limit).then_some(TypeLabel::CategoryText)
}

fn numeric_rule(
    classifier: &TypeClassifier<'_>,
    view: &ColumnView<'_>,
    _: &mut dyn Sampler,
) -> Option<TypeLabel> {
    let numbers = view
        .values
        .iter()
        .map(|value| value.to_number())
        .collect::<Option<Vec<_>>>()?;
    if numbers.iter().all(|n| n.fract() == 0.0) {
        if distinct_numbers(&numbers) < classifier.config.int_category_limit {
            Some(TypeLabel::CategoryInt)
        } else {
            Some(TypeLabel::Int)
        }
    } else {
        Some(TypeLabel::Float)
    }
}

pub(crate) fn distinct_numbers(numbers: &[f64]) -> usize {
    numbers
        .iter()
        .map(|n| if *n == 0.0 { 0u64 } else { n.to_bits() })
        .collect::<HashSet<_>>()
        .len()
}
