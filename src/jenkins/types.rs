use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level body returned by `/api/json?tree=jobs[...]`.
#[derive(Debug, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// A Jenkins job with its seven "last build of kind X" references.
///
/// Older servers do not know `fullName`; newer ones may omit `name` when it is not
/// requested. Every slot is `None` when the server reports no such build yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub url: Option<String>,
    /// Ball color of the job as a whole (e.g. "blue", "red_anime")
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub last_build: Option<BuildRef>,
    #[serde(default)]
    pub last_completed_build: Option<BuildRef>,
    #[serde(default)]
    pub last_failed_build: Option<BuildRef>,
    #[serde(default)]
    pub last_stable_build: Option<BuildRef>,
    #[serde(default)]
    pub last_successful_build: Option<BuildRef>,
    #[serde(default)]
    pub last_unstable_build: Option<BuildRef>,
    #[serde(default)]
    pub last_unsuccessful_build: Option<BuildRef>,
}

impl Job {
    /// Label the job's samples are published under: `fullName` when the server
    /// provides a non-empty one, `name` otherwise.
    pub fn label(&self) -> &str {
        match self.full_name.as_deref() {
            Some(full_name) if !full_name.is_empty() => full_name,
            _ => &self.name,
        }
    }

    pub fn build(&self, slot: Slot) -> Option<&BuildRef> {
        match slot {
            Slot::LastBuild => self.last_build.as_ref(),
            Slot::LastCompletedBuild => self.last_completed_build.as_ref(),
            Slot::LastFailedBuild => self.last_failed_build.as_ref(),
            Slot::LastStableBuild => self.last_stable_build.as_ref(),
            Slot::LastSuccessfulBuild => self.last_successful_build.as_ref(),
            Slot::LastUnstableBuild => self.last_unstable_build.as_ref(),
            Slot::LastUnsuccessfulBuild => self.last_unsuccessful_build.as_ref(),
        }
    }
}

/// Summary of one build as embedded in a job's slot.
///
/// The `Default` value stands for "no build": number, timestamp and duration are 0,
/// there is no result and no actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildRef {
    /// Build number, 1-indexed
    #[serde(default, deserialize_with = "lenient_i64")]
    pub number: i64,
    /// Start time in milliseconds since the epoch
    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: i64,
    /// Build duration in milliseconds, 0 while running
    #[serde(default, deserialize_with = "lenient_i64")]
    pub duration: i64,
    /// Final result (e.g. "SUCCESS", "FAILURE"), absent while running
    #[serde(default)]
    pub result: Option<String>,
    /// Plugin-contributed actions, in server order
    #[serde(default, deserialize_with = "skip_null_entries")]
    pub actions: Vec<Action>,
}

/// A plugin-contributed annotation on a build.
///
/// Jenkins serializes every action of a build, most of them as empty objects once the
/// tree filter is applied. Only cause, queue-time and test-result shapes are read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "skip_null_entries")]
    pub causes: Vec<Cause>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub queuing_duration_millis: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_duration_millis: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub skip_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fail_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pass_count: Option<i64>,
}

impl Action {
    pub fn has_class(&self, class: &str) -> bool {
        self.class.as_deref() == Some(class)
    }
}

/// Why a build was started. Newer servers fill `class`, older ones only
/// `short_description`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cause {
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
}

/// One of the seven per-job build references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    LastBuild,
    LastCompletedBuild,
    LastFailedBuild,
    LastStableBuild,
    LastSuccessfulBuild,
    LastUnstableBuild,
    LastUnsuccessfulBuild,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::LastBuild,
        Slot::LastCompletedBuild,
        Slot::LastFailedBuild,
        Slot::LastStableBuild,
        Slot::LastSuccessfulBuild,
        Slot::LastUnstableBuild,
        Slot::LastUnsuccessfulBuild,
    ];

    /// Field name in the Jenkins JSON API.
    pub fn api_name(self) -> &'static str {
        match self {
            Slot::LastBuild => "lastBuild",
            Slot::LastCompletedBuild => "lastCompletedBuild",
            Slot::LastFailedBuild => "lastFailedBuild",
            Slot::LastStableBuild => "lastStableBuild",
            Slot::LastSuccessfulBuild => "lastSuccessfulBuild",
            Slot::LastUnstableBuild => "lastUnstableBuild",
            Slot::LastUnsuccessfulBuild => "lastUnsuccessfulBuild",
        }
    }

    /// Name used inside Prometheus metric names.
    pub fn snake_name(self) -> &'static str {
        match self {
            Slot::LastBuild => "last_build",
            Slot::LastCompletedBuild => "last_completed_build",
            Slot::LastFailedBuild => "last_failed_build",
            Slot::LastStableBuild => "last_stable_build",
            Slot::LastSuccessfulBuild => "last_successful_build",
            Slot::LastUnstableBuild => "last_unstable_build",
            Slot::LastUnsuccessfulBuild => "last_unsuccessful_build",
        }
    }
}

// Older servers emit numeric fields as strings, and any field can be null.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or(0))
}

#[allow(clippy::cast_possible_truncation)]
fn number_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn skip_null_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(entries.into_iter().flatten().flatten().collect())
}
