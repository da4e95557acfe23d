use std::fmt::Write;

use crate::jenkins::Slot;
use crate::metrics::{MetricSet, Property};
use crate::snapshot::Snapshot;

use super::styling::{bright, dim};
use super::tables::{color_label, job_table};

/// Prints every job of a snapshot as a table of its build slots.
pub fn print_summary(snapshot: &Snapshot) {
    println!("{}", render_summary(snapshot));
}

fn render_summary(snapshot: &Snapshot) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} {}",
        bright("📊"),
        bright(format!("{} jobs on {}", snapshot.total_jobs, snapshot.server)).underlined()
    );
    let _ = writeln!(
        output,
        "{}",
        dim(format!(
            "collected at {}",
            snapshot.collected_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
    );

    for set in &snapshot.jobs {
        let _ = writeln!(output);
        let _ = writeln!(output, "{}  {}", bright(&set.job), dim(job_color(set)));
        let _ = writeln!(output, "{}", job_table(set));
    }

    output
}

fn job_color(set: &MetricSet) -> String {
    let color = set
        .get(Slot::LastBuild, Property::Color)
        .map_or("-", color_label);
    format!("color: {color}")
}
