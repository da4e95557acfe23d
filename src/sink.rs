use std::collections::HashMap;

use log::warn;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::error::Result;
use crate::metrics::{MetricKey, MetricSet, Property};

/// Label every job gauge is partitioned by.
pub const JOB_LABEL: &str = "jobname";

/// Destination of derived samples.
///
/// Implementations must be safe to call from several tasks at once; a later value for
/// the same (key, job) pair replaces the earlier one.
pub trait MetricsSink: Send + Sync {
    fn set(&self, key: MetricKey, job: &str, value: f64);

    fn publish(&self, set: &MetricSet) {
        for (&key, &value) in &set.values {
            self.set(key, &set.job, value);
        }
    }
}

/// Prometheus registry holding one gauge vector per (slot, property) pair.
///
/// Built once at startup and shared between the poll loop and the `/metrics`
/// endpoint.
pub struct JobGauges {
    registry: Registry,
    gauges: HashMap<MetricKey, GaugeVec>,
}

impl JobGauges {
    /// Registers `<namespace>_job_<slot>_<property>` for every slot and property.
    pub fn new(namespace: &str, properties: &[Property]) -> Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::new();

        for key in MetricKey::all(properties) {
            let help = format!("{} for {}", key.property.help(), key.slot.api_name());
            let gauge = GaugeVec::new(
                Opts::new(key.metric_name(), help).namespace(namespace),
                &[JOB_LABEL],
            )?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(key, gauge);
        }

        Ok(Self { registry, gauges })
    }

    /// Renders every gauge in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl MetricsSink for JobGauges {
    fn set(&self, key: MetricKey, job: &str, value: f64) {
        match self.gauges.get(&key) {
            Some(gauge) => gauge.with_label_values(&[job]).set(value),
            None => warn!("No gauge registered for {key}, dropping sample for {job}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::jenkins::{Job, Slot};
    use crate::metrics::build_metric_set;

    fn gauge_value(gauges: &JobGauges, key: MetricKey, job: &str) -> f64 {
        gauges.gauges[&key].with_label_values(&[job]).get()
    }

    #[test]
    fn test_registers_one_family_per_key() {
        let gauges = JobGauges::new("jenkins", &Property::CORE).unwrap();
        assert_eq!(gauges.gauges.len(), 7 * 7 + 1);

        let names: Vec<String> = MetricKey::all(&Property::CORE)
            .map(|key| format!("jenkins_{}", key.metric_name()))
            .collect();
        assert!(names.contains(&"jenkins_job_last_build_color".to_string()));
        assert!(!names.contains(&"jenkins_job_last_failed_build_color".to_string()));
    }

    #[test]
    fn test_publish_sets_labeled_gauges() {
        let gauges = JobGauges::new("jenkins", &Property::CORE).unwrap();
        let job: Job = serde_json::from_str(
            r#"{"name": "app", "fullName": "team/app", "lastBuild": {"number": 42, "timestamp": 1700000000000, "duration": 5000, "result": "SUCCESS"}}"#,
        )
        .unwrap();

        gauges.publish(&build_metric_set(&job, &Property::CORE));

        let number = MetricKey::new(Slot::LastBuild, Property::Number);
        let duration = MetricKey::new(Slot::LastBuild, Property::Duration);
        assert_eq!(gauge_value(&gauges, number, "team/app"), 42.0);
        assert_eq!(gauge_value(&gauges, duration, "team/app"), 5.0);
    }

    #[test]
    fn test_later_value_overwrites_earlier_one() {
        let gauges = JobGauges::new("jenkins", &Property::CORE).unwrap();
        let key = MetricKey::new(Slot::LastStableBuild, Property::Number);

        gauges.set(key, "app", 1.0);
        gauges.set(key, "app", 2.0);

        assert_eq!(gauge_value(&gauges, key, "app"), 2.0);
    }

    #[test]
    fn test_unregistered_key_is_dropped() {
        let gauges = JobGauges::new("jenkins", &Property::CORE).unwrap();
        let key = MetricKey::new(Slot::LastBuild, Property::PassCount);

        gauges.set(key, "app", 1.0);

        assert!(!gauges.gauges.contains_key(&key));
    }

    #[test]
    fn test_encode_uses_namespace_and_label() {
        let gauges = JobGauges::new("ci", &Property::CORE).unwrap();
        let key = MetricKey::new(Slot::LastBuild, Property::QueuingDuration);
        gauges.set(key, "team/app", 3.0);

        let output = gauges.encode().unwrap();

        assert!(output.contains("# TYPE ci_job_last_build_queuing_duration_seconds gauge"));
        assert!(output
            .contains(r#"ci_job_last_build_queuing_duration_seconds{jobname="team/app"} 3"#));
    }
}
