//! Pure classifiers turning one build (or its action list) into a single number.
//!
//! None of these fail: input that matches no known shape degrades to
//! [`NO_DATA`] or [`UNKNOWN`].

use super::codes::{
    self, CAUSE_ACTION_CLASS, NO_DATA, RESULT_NOT_BUILT, RESULT_RUNNING, TIME_IN_QUEUE_ACTION_CLASS,
    UNKNOWN,
};
use crate::jenkins::types::{Action, BuildRef, Cause};

/// Timing fields of the queue-time action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueField {
    Queuing,
    Total,
}

/// Counter fields of a test-result action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCountField {
    Skip,
    Fail,
    Total,
    Pass,
}

/// First action matching `predicate`, in server order.
pub fn find_action(actions: &[Action], predicate: impl Fn(&Action) -> bool) -> Option<&Action> {
    actions.iter().find(|action| predicate(action))
}

pub fn classify_color(color: Option<&str>) -> f64 {
    color.map_or(NO_DATA, codes::color_code)
}

/// Result code of a build.
///
/// A finished result wins regardless of the other fields. Otherwise a build with no
/// timestamp (or explicitly `NOT_BUILT`) has not been built, and one with no duration
/// is still running.
pub fn classify_result(build: &BuildRef) -> f64 {
    let result = build.result.as_deref().unwrap_or_default();
    if let Some(code) = codes::finished_result_code(result) {
        return code;
    }
    if build.timestamp == 0 || result == "NOT_BUILT" {
        return RESULT_NOT_BUILT;
    }
    if build.duration == 0 {
        return RESULT_RUNNING;
    }
    UNKNOWN
}

/// Cause code of a build, read from its first cause entry.
///
/// Newer servers attach a typed `CauseAction`; older ones an unclassed action whose
/// causes only carry a description. Multi-cause builds are reported by their first
/// cause only. A `CauseAction` without any cause entry yields [`NO_DATA`].
pub fn classify_cause(build: &BuildRef) -> f64 {
    if let Some(action) = find_action(&build.actions, |action| {
        action.has_class(CAUSE_ACTION_CLASS)
    }) {
        return action.causes.first().map_or(NO_DATA, |cause| {
            codes::cause_class_code(cause.class.as_deref().unwrap_or_default())
        });
    }

    let untyped = find_action(&build.actions, |action| !action.causes.is_empty());
    match untyped.and_then(|action| action.causes.first()) {
        Some(cause) => described_cause_code(cause),
        None => NO_DATA,
    }
}

fn described_cause_code(cause: &Cause) -> f64 {
    cause
        .short_description
        .as_deref()
        .map_or(UNKNOWN, codes::cause_description_code)
}

/// Queue timing in whole seconds, or [`NO_DATA`] when the metrics plugin did not
/// instrument the build.
pub fn extract_queue_duration(actions: &[Action], field: QueueField) -> f64 {
    let Some(action) = find_action(actions, |action| {
        action.has_class(TIME_IN_QUEUE_ACTION_CLASS)
    }) else {
        return NO_DATA;
    };

    let millis = match field {
        QueueField::Queuing => action.queuing_duration_millis,
        QueueField::Total => action.total_duration_millis,
    };
    millis_to_whole_seconds(millis.unwrap_or(0))
}

/// Test counter from the first action that reports test totals, or [`NO_DATA`].
#[allow(clippy::cast_precision_loss)]
pub fn extract_test_count(actions: &[Action], field: TestCountField) -> f64 {
    let Some(action) = find_action(actions, |action| action.total_count.is_some()) else {
        return NO_DATA;
    };

    let count = match field {
        TestCountField::Skip => action.skip_count,
        TestCountField::Fail => action.fail_count,
        TestCountField::Total => action.total_count,
        TestCountField::Pass => action.pass_count,
    };
    count.unwrap_or(0) as f64
}

#[allow(clippy::cast_precision_loss)]
fn millis_to_whole_seconds(millis: i64) -> f64 {
    (millis / 1000) as f64
}
