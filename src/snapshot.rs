use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::MetricSet;

/// Metric sets of every job from a single poll, as printed by `snapshot`.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub server: String,
    pub collected_at: DateTime<Utc>,
    pub total_jobs: usize,
    pub jobs: Vec<MetricSet>,
}

impl Snapshot {
    pub fn new(server: String, jobs: Vec<MetricSet>) -> Self {
        Self {
            server,
            collected_at: Utc::now(),
            total_jobs: jobs.len(),
            jobs,
        }
    }
}
