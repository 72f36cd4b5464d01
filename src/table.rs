//! Plain-text rendering of profile reports for the terminal.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::profile::ProfileReport;

const REPORT_HEADERS: [&str; 5] = ["column", "data_type", "nulls", "real_name", "value_range"];

pub fn render_report(report: &ProfileReport) -> String {
    let headers = REPORT_HEADERS.map(str::to_string);
    let rows = report
        .rows
        .iter()
        .map(|row| {
            let nulls = row
                .info
                .value_range
                .null_stats()
                .map_or_else(String::new, |n| {
                    format!("{} ({}%)", n.null_count, n.null_percentage)
                });
            vec![
                row.column_name.clone(),
                row.info.data_type.to_string(),
                nulls,
                row.info.real_name.clone().unwrap_or_default(),
                row.info.value_range.brief(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

pub fn print_report(report: &ProfileReport) {
    print!("{}", render_report(report));
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

/// Terminal columns occupied by `value`; CJK and full-width characters take
/// two.
fn display_width(value: &str) -> usize {
    value
        .chars()
        .map(|ch| match ch as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60 => 2,
            _ => 1,
        })
        .sum()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        label::{DataType, TypeLabel},
        profile::{Info, ProfileRow},
        summarize::{CategoryValues, NullStats, Stats},
    };

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let headers = vec!["a".to_string(), "bb".to_string()];
        let rows = vec![vec!["long".to_string(), "x".to_string()]];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "a     bb");
        assert_eq!(lines[1], "----  ---");
        assert_eq!(lines[2], "long  x");
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(display_width("性别"), 4);
        assert_eq!(display_width("age"), 3);
    }

    #[test]
    fn report_rows_show_type_nulls_and_summary() {
        let report = ProfileReport::new(vec![ProfileRow {
            column_name: "gender".to_string(),
            info: Info {
                data_type: DataType::Label(TypeLabel::CategoryInt),
                value_range: Stats::categories(
                    NullStats {
                        null_count: 1,
                        null_percentage: 12.5,
                    },
                    CategoryValues::Integers(vec![1, 2]),
                ),
                real_name: Some("性别".to_string()),
            },
        }]);
        let rendered = render_report(&report);
        let row = rendered.lines().nth(2).unwrap();
        assert!(row.starts_with("gender"));
        assert!(row.contains("category_int"));
        assert!(row.contains("1 (12.5%)"));
        assert!(row.contains("性别"));
        assert!(row.ends_with("2 value(s): 1, 2"));
    }
}
