use std::collections::BTreeSet;

use csv_profiler::{
    config::ProfilerConfig,
    frame::{Column, Table},
    label::{DataType, TypeLabel},
    profile::ColumnProfiler,
    sampler::RandomSampler,
    summarize::{CategoryValues, Stats},
};
use itertools::Itertools;
use proptest::prelude::*;

fn strictly_increasing(values: &[i64]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

proptest! {
    #[test]
    fn null_stats_partition_the_column(
        cells in proptest::collection::vec(proptest::option::of(-500i64..500), 1..60)
    ) {
        let column = Column::new("n", cells.clone());
        let config = ProfilerConfig::default();
        let info = ColumnProfiler::new(&config).profile_column(&column, &mut RandomSampler::seeded(5));
        let nulls = cells.iter().filter(|c| c.is_none()).count();

        if nulls == cells.len() {
            prop_assert_eq!(info.data_type, DataType::Label(TypeLabel::Unknown));
            prop_assert_eq!(info.value_range, Stats::empty());
        } else {
            prop_assert_ne!(&info.data_type, &DataType::Label(TypeLabel::Unknown));
            let stats = info.value_range.null_stats().expect("null stats present");
            prop_assert_eq!(stats.null_count, nulls);
            let expected = ((nulls as f64 / cells.len() as f64 * 100.0) * 100.0).round_ties_even() / 100.0;
            prop_assert_eq!(stats.null_percentage, expected);
            prop_assert!((0.0..=100.0).contains(&stats.null_percentage));
        }
    }

    #[test]
    fn integer_categories_are_sorted_and_distinct(
        values in proptest::collection::vec(0i64..8, 1..40)
    ) {
        let column = Column::new("c", values.clone());
        let config = ProfilerConfig::default();
        let info = ColumnProfiler::new(&config).profile_column(&column, &mut RandomSampler::seeded(5));
        prop_assert_eq!(info.data_type, DataType::Label(TypeLabel::CategoryInt));
        let expected = values.iter().copied().sorted().dedup().collect::<Vec<_>>();
        match info.value_range.category_values() {
            Some(CategoryValues::Integers(found)) => {
                prop_assert!(strictly_increasing(found));
                prop_assert_eq!(found, &expected);
            }
            other => prop_assert!(false, "unexpected category values {:?}", other),
        }
    }

    #[test]
    fn list_categories_union_every_row(
        lists in proptest::collection::vec(proptest::collection::vec(0i64..50, 1..5), 1..12)
    ) {
        let raw = lists
            .iter()
            .map(|list| format!("[{}]", list.iter().join(", ")))
            .collect::<Vec<_>>();
        let column = Column::new("l", raw.iter().map(String::as_str));
        let config = ProfilerConfig::default();
        let info = ColumnProfiler::new(&config).profile_column(&column, &mut RandomSampler::seeded(5));
        prop_assert_eq!(info.data_type, DataType::Label(TypeLabel::CategoryListInt));
        let expected = lists.iter().flatten().copied().collect::<BTreeSet<_>>();
        match info.value_range.category_values() {
            Some(CategoryValues::Integers(found)) => {
                prop_assert!(strictly_increasing(found));
                prop_assert_eq!(found.iter().copied().collect::<BTreeSet<_>>(), expected);
            }
            other => prop_assert!(false, "unexpected category values {:?}", other),
        }
    }

    #[test]
    fn seeded_profiles_repeat(
        days in proptest::collection::vec(1u32..=28, 120..200),
        noise in proptest::collection::vec("[a-z]{3,8}", 20..60),
        seed in any::<u64>()
    ) {
        let mut values = days
            .iter()
            .map(|day| format!("2022-03-{day:02}"))
            .collect::<Vec<_>>();
        values.extend(noise);
        let table = Table::new(vec![Column::new("mixed", values.iter().map(String::as_str))]);
        let config = ProfilerConfig::default().with_seed(seed);
        let profiler = ColumnProfiler::new(&config);
        let first = serde_json::to_string(&profiler.profile(&table)).expect("serialize");
        let second = serde_json::to_string(&profiler.profile(&table)).expect("serialize");
        prop_assert_eq!(first, second);
    }
}

#[test]
fn five_distinct_names_are_text_and_four_are_categories() {
    let config = ProfilerConfig::default();
    let profiler = ColumnProfiler::new(&config);
    let five = Column::new("product", ["lamp", "desk", "chair", "shelf", "stool"]);
    let four = Column::new("product", ["lamp", "desk", "chair", "shelf", "lamp"]);
    let mut sampler = RandomSampler::seeded(1);
    assert_eq!(
        profiler.profile_column(&five, &mut sampler).data_type,
        DataType::Label(TypeLabel::Text)
    );
    assert_eq!(
        profiler.profile_column(&four, &mut sampler).data_type,
        DataType::Label(TypeLabel::CategoryText)
    );
}

#[test]
fn malformed_list_rows_do_not_abort_list_float_columns() {
    let column = Column::new(
        "readings",
        [Some("[0.5, 1.5]"), Some("[2.5"), Some("[3.5, 4.5, 5.5]"), None],
    );
    let config = ProfilerConfig::default();
    let info = ColumnProfiler::new(&config).profile_column(&column, &mut RandomSampler::seeded(1));
    assert_eq!(info.data_type, DataType::Label(TypeLabel::ListFloat));
    match info.value_range {
        Stats::ListFloat {
            min,
            max,
            avg_list_length,
            ..
        } => {
            assert_eq!(min, 0.5);
            assert_eq!(max, 5.5);
            assert_eq!(avg_list_length, 2.5);
        }
        other => panic!("expected list stats, got {other:?}"),
    }
}
