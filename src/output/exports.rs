use anyhow::Result;
use std::io::Write;

use crate::snapshot::Snapshot;

use super::OutputFormat;

/// Writes a snapshot in a machine-readable format.
///
/// - JSON: the full snapshot document
/// - CSV: one `job,metric,value` line per sample
pub fn export_snapshot(
    snapshot: &Snapshot,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            // Summary format is printed directly by the CLI
            unreachable!("Summary format should be handled in CLI")
        }
        OutputFormat::Json => export_json(snapshot, pretty, output),
        OutputFormat::Csv => export_csv(snapshot, output),
    }
}

fn export_json(snapshot: &Snapshot, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn export_csv(snapshot: &Snapshot, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "job,metric,value")?;
    for set in &snapshot.jobs {
        let job = set.job.replace('"', "\"\"");
        for (key, value) in &set.values {
            writeln!(output, "\"{job}\",{key},{value}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jenkins::Job;
    use crate::metrics::{build_metric_set, Property};

    fn snapshot() -> Snapshot {
        let job = Job {
            name: "app".to_string(),
            full_name: Some("team/\"app\"".to_string()),
            ..Job::default()
        };
        Snapshot::new(
            "http://jenkins:8080".to_string(),
            vec![build_metric_set(&job, &Property::CORE)],
        )
    }

    #[test]
    fn test_export_json() {
        let mut buffer = Vec::new();
        export_snapshot(&snapshot(), OutputFormat::Json, false, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["server"], "http://jenkins:8080");
        assert_eq!(value["total_jobs"], 1);
        assert_eq!(value["jobs"][0]["values"]["lastBuildCause"], -1.0);
    }

    #[test]
    fn test_export_csv() {
        let mut buffer = Vec::new();
        export_snapshot(&snapshot(), OutputFormat::Csv, false, &mut buffer).unwrap();

        let csv = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "job,metric,value");
        assert_eq!(lines[1], "\"team/\"\"app\"\"\",lastBuildNumber,0");
        assert_eq!(lines.len(), 1 + 7 * 7 + 1);
        assert!(lines.contains(&"\"team/\"\"app\"\"\",lastBuildResult,3"));
    }
}
