use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::classify::{
    classify_cause, classify_color, classify_result, extract_queue_duration,
    extract_test_count, QueueField, TestCountField,
};
use crate::jenkins::types::{BuildRef, Job, Slot};

/// A per-slot property published as one gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Number,
    Color,
    Result,
    Cause,
    Timestamp,
    Duration,
    QueuingDuration,
    TotalDuration,
    SkipCount,
    FailCount,
    TotalCount,
    PassCount,
}

impl Property {
    /// The property set emitted for every slot of every job.
    pub const CORE: [Property; 8] = [
        Property::Number,
        Property::Color,
        Property::Result,
        Property::Cause,
        Property::Timestamp,
        Property::Duration,
        Property::QueuingDuration,
        Property::TotalDuration,
    ];

    /// Test counters, only emitted when explicitly enabled.
    pub const TEST_COUNTS: [Property; 4] = [
        Property::SkipCount,
        Property::FailCount,
        Property::TotalCount,
        Property::PassCount,
    ];

    pub fn enabled(test_counts: bool) -> Vec<Property> {
        let mut properties = Self::CORE.to_vec();
        if test_counts {
            properties.extend(Self::TEST_COUNTS);
        }
        properties
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::Number => "Number",
            Property::Color => "Color",
            Property::Result => "Result",
            Property::Cause => "Cause",
            Property::Timestamp => "Timestamp",
            Property::Duration => "Duration",
            Property::QueuingDuration => "QueuingDuration",
            Property::TotalDuration => "TotalDuration",
            Property::SkipCount => "SkipCount",
            Property::FailCount => "FailCount",
            Property::TotalCount => "TotalCount",
            Property::PassCount => "PassCount",
        }
    }

    /// Suffix of the Prometheus metric name.
    pub fn metric_suffix(self) -> &'static str {
        match self {
            Property::Number => "number",
            Property::Color => "color",
            Property::Result => "result",
            Property::Cause => "cause",
            Property::Timestamp => "timestamp_seconds",
            Property::Duration => "duration_seconds",
            Property::QueuingDuration => "queuing_duration_seconds",
            Property::TotalDuration => "total_duration_seconds",
            Property::SkipCount => "skip_count",
            Property::FailCount => "fail_count",
            Property::TotalCount => "total_count",
            Property::PassCount => "pass_count",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Property::Number => "Jenkins build number",
            Property::Color => "Jenkins job color code",
            Property::Result => "Jenkins build result code",
            Property::Cause => "Jenkins build cause code",
            Property::Timestamp => "Jenkins build start time in unixtime",
            Property::Duration => "Jenkins build duration in seconds",
            Property::QueuingDuration => "Jenkins build queuing duration in seconds",
            Property::TotalDuration => "Jenkins build total duration in seconds",
            Property::SkipCount => "Jenkins build skipped test count",
            Property::FailCount => "Jenkins build failed test count",
            Property::TotalCount => "Jenkins build total test count",
            Property::PassCount => "Jenkins build passed test count",
        }
    }

    /// Color is a job-level attribute and is only published on the `lastBuild` slot.
    pub fn applies_to(self, slot: Slot) -> bool {
        self != Property::Color || slot == Slot::LastBuild
    }
}

/// Identifies one gauge: `<slot><Property>`, e.g. `lastBuildNumber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    pub slot: Slot,
    pub property: Property,
}

impl MetricKey {
    pub fn new(slot: Slot, property: Property) -> Self {
        Self { slot, property }
    }

    /// Every key published for the given property set, slot-major.
    pub fn all(properties: &[Property]) -> impl Iterator<Item = MetricKey> + '_ {
        Slot::ALL.into_iter().flat_map(move |slot| {
            properties
                .iter()
                .filter(move |property| property.applies_to(slot))
                .map(move |&property| MetricKey::new(slot, property))
        })
    }

    /// Metric name without namespace, e.g. `job_last_build_duration_seconds`.
    pub fn metric_name(self) -> String {
        format!(
            "job_{}_{}",
            self.slot.snake_name(),
            self.property.metric_suffix()
        )
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.slot.api_name(), self.property.name())
    }
}

impl Serialize for MetricKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// All values derived from one job in one poll.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSet {
    /// Label the samples are published under
    pub job: String,
    pub values: IndexMap<MetricKey, f64>,
}

impl MetricSet {
    pub fn get(&self, slot: Slot, property: Property) -> Option<f64> {
        self.values.get(&MetricKey::new(slot, property)).copied()
    }
}

/// Derives every requested property for all seven slots of `job`.
///
/// A slot the server did not report is evaluated as a zero-value build so that every
/// key is still emitted. The job label is chosen once, before any value is computed.
pub fn build_metric_set(job: &Job, properties: &[Property]) -> MetricSet {
    let missing = BuildRef::default();
    let values = MetricKey::all(properties)
        .map(|key| {
            let build = job.build(key.slot).unwrap_or(&missing);
            (key, property_value(job, build, key.property))
        })
        .collect();

    MetricSet {
        job: job.label().to_string(),
        values,
    }
}

#[allow(clippy::cast_precision_loss)]
fn property_value(job: &Job, build: &BuildRef, property: Property) -> f64 {
    match property {
        Property::Number => build.number as f64,
        Property::Color => classify_color(job.color.as_deref()),
        Property::Result => classify_result(build),
        Property::Cause => classify_cause(build),
        Property::Timestamp => build.timestamp as f64 / 1000.0,
        Property::Duration => build.duration as f64 / 1000.0,
        Property::QueuingDuration => extract_queue_duration(&build.actions, QueueField::Queuing),
        Property::TotalDuration => extract_queue_duration(&build.actions, QueueField::Total),
        Property::SkipCount => extract_test_count(&build.actions, TestCountField::Skip),
        Property::FailCount => extract_test_count(&build.actions, TestCountField::Fail),
        Property::TotalCount => extract_test_count(&build.actions, TestCountField::Total),
        Property::PassCount => extract_test_count(&build.actions, TestCountField::Pass),
    }
}
