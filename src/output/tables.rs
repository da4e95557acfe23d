use chrono::DateTime;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::jenkins::Slot;
use crate::metrics::codes::{NO_DATA, UNKNOWN};
use crate::metrics::{MetricSet, Property};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// One row per build slot, one column per property (color is shown per job).
pub fn job_table(set: &MetricSet) -> Table {
    let properties: Vec<Property> = set
        .values
        .keys()
        .filter(|key| key.slot == Slot::LastBuild && key.property != Property::Color)
        .map(|key| key.property)
        .collect();

    let mut header = vec!["Slot"];
    header.extend(properties.iter().map(|p| p.name()));

    let mut table = create_table();
    table.set_header(create_cyan_header(&header));

    for slot in Slot::ALL {
        let mut row = vec![Cell::new(slot.api_name())];
        row.extend(
            properties
                .iter()
                .map(|&property| value_cell(property, set.get(slot, property))),
        );
        table.add_row(row);
    }

    table
}

pub fn value_cell(property: Property, value: Option<f64>) -> Cell {
    match value {
        None => Cell::new("-").fg(TableColor::DarkGrey),
        Some(v) if v == NO_DATA && property != Property::Number => {
            Cell::new("-").fg(TableColor::DarkGrey)
        }
        Some(v) => match property {
            Property::Result => result_cell(v),
            Property::Cause => Cell::new(cause_label(v)),
            Property::Color => Cell::new(color_label(v)),
            Property::Timestamp => Cell::new(format_timestamp(v)),
            Property::Duration | Property::QueuingDuration | Property::TotalDuration => {
                Cell::new(format!("{v:.0}s"))
            }
            _ => Cell::new(format!("{v:.0}")),
        },
    }
}

fn result_cell(code: f64) -> Cell {
    let (label, color) = match code {
        c if c == 0.0 => ("FAILURE", TableColor::Red),
        c if c == 0.5 => ("UNSTABLE", TableColor::Yellow),
        c if c == 1.0 => ("SUCCESS", TableColor::Green),
        c if c == 2.0 => ("ABORTED", TableColor::DarkGrey),
        c if c == 3.0 => ("NOT BUILT", TableColor::DarkGrey),
        c if c == 4.0 => ("RUNNING", TableColor::Blue),
        _ => ("UNKNOWN", TableColor::Magenta),
    };
    Cell::new(label).fg(color)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cause_label(code: f64) -> &'static str {
    const LABELS: [&str; 11] = [
        "timer",
        "user",
        "upstream",
        "scm",
        "branch indexing",
        "webhook",
        "cli",
        "remote",
        "replay",
        "restart",
        "branch event",
    ];
    if code == UNKNOWN || code < 0.0 || code.fract() != 0.0 {
        return "unknown";
    }
    LABELS.get(code as usize).copied().unwrap_or("unknown")
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn color_label(code: f64) -> &'static str {
    const LABELS: [&str; 7] = [
        "blue", "red", "yellow", "notbuilt", "disabled", "aborted", "grey",
    ];
    if code == NO_DATA {
        return "-";
    }
    if code < 0.0 || code.fract() != 0.0 {
        return "unknown";
    }
    LABELS.get(code as usize).copied().unwrap_or("unknown")
}

#[allow(clippy::cast_possible_truncation)]
fn format_timestamp(seconds: f64) -> String {
    if seconds == 0.0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(seconds as i64, 0).map_or_else(
        || format!("{seconds:.0}"),
        |dt| dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jenkins::Job;
    use crate::metrics::build_metric_set;

    #[test]
    fn test_cause_labels() {
        assert_eq!(cause_label(0.0), "timer");
        assert_eq!(cause_label(10.0), "branch event");
        assert_eq!(cause_label(UNKNOWN), "unknown");
        assert_eq!(cause_label(0.5), "unknown");
    }

    #[test]
    fn test_color_labels() {
        assert_eq!(color_label(0.0), "blue");
        assert_eq!(color_label(6.0), "grey");
        assert_eq!(color_label(NO_DATA), "-");
        assert_eq!(color_label(UNKNOWN), "unknown");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "-");
        assert_eq!(format_timestamp(1_700_000_000.0), "2023-11-14 22:13 UTC");
    }

    #[test]
    fn test_job_table_has_row_per_slot() {
        let job = Job {
            name: "app".to_string(),
            ..Job::default()
        };
        let table = job_table(&build_metric_set(&job, &Property::CORE));
        let rendered = table.to_string();

        assert_eq!(table.row_iter().count(), 7);
        assert!(rendered.contains("lastUnsuccessfulBuild"));
        assert!(rendered.contains("NOT BUILT"));
        assert!(!rendered.contains("Color"));
    }
}
