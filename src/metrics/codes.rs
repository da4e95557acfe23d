//! Numeric code tables for build colors, results and trigger causes.
//!
//! Codes are append-only: dashboards key on these numbers, so a new color or cause
//! gets a new code and existing ones never move.

/// Value reported when the underlying data is absent.
pub const NO_DATA: f64 = -1.0;

/// Value reported when data is present but not in any table.
pub const UNKNOWN: f64 = 100.0;

/// Class of the action that carries typed build causes.
pub const CAUSE_ACTION_CLASS: &str = "hudson.model.CauseAction";

/// Class of the action contributed by the metrics plugin with queue timings.
pub const TIME_IN_QUEUE_ACTION_CLASS: &str = "jenkins.metrics.impl.TimeInQueueAction";

pub fn color_code(color: &str) -> f64 {
    match color.strip_suffix("_anime").unwrap_or(color) {
        "blue" => 0.0,
        "red" => 1.0,
        "yellow" => 2.0,
        "notbuilt" => 3.0,
        "disabled" => 4.0,
        "aborted" => 5.0,
        "grey" => 6.0,
        _ => UNKNOWN,
    }
}

/// Code for a result string that Jenkins reports once a build has finished.
///
/// Returns `None` for anything that needs the build's timestamp and duration to be
/// decided (no result yet, `NOT_BUILT`, unknown values).
pub fn finished_result_code(result: &str) -> Option<f64> {
    match result {
        "FAILURE" => Some(0.0),
        "UNSTABLE" => Some(0.5),
        "SUCCESS" => Some(1.0),
        "ABORTED" => Some(2.0),
        _ => None,
    }
}

pub const RESULT_NOT_BUILT: f64 = 3.0;
pub const RESULT_RUNNING: f64 = 4.0;

/// Code for a typed cause identifier, as reported by newer servers.
pub fn cause_class_code(class: &str) -> f64 {
    match class {
        "hudson.triggers.TimerTrigger$TimerTriggerCause"
        | "org.jenkinsci.plugins.parameterizedscheduler.ParameterizedTimerTriggerCause" => 0.0,
        "hudson.model.Cause$UserIdCause"
        | "au.com.centrumsystems.hudson.plugin.buildpipeline.BuildPipelineView$MyUserIdCause" => {
            1.0
        }
        "hudson.model.Cause$UpstreamCause" => 2.0,
        "hudson.triggers.SCMTrigger$SCMTriggerCause" => 3.0,
        "jenkins.branch.BranchIndexingCause" => 4.0,
        "com.dabsquared.gitlabjenkins.cause.GitLabWebHookCause" => 5.0,
        "hudson.cli.BuildCommand$CLICause" => 6.0,
        "hudson.model.Cause$RemoteCause" => 7.0,
        "org.jenkinsci.plugins.workflow.cps.replay.ReplayCause" => 8.0,
        "org.jenkinsci.plugins.pipeline.modeldefinition.causes.RestartDeclarativePipelineCause" => {
            9.0
        }
        "jenkins.branch.BranchEventCause" => 10.0,
        _ => UNKNOWN,
    }
}

/// Free-text prefixes older servers put in `shortDescription`.
const CAUSE_DESCRIPTION_PREFIXES: &[(&str, f64)] = &[
    ("Started by timer", 0.0),
    ("Started by user", 1.0),
    ("Started by upstream project", 2.0),
    ("Started by an SCM change", 3.0),
    ("Started by remote host", 7.0),
];

pub fn cause_description_code(description: &str) -> f64 {
    CAUSE_DESCRIPTION_PREFIXES
        .iter()
        .find(|(prefix, _)| description.starts_with(prefix))
        .map_or(UNKNOWN, |&(_, code)| code)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_color_codes_include_animated_variants() {
        let table = [
            ("blue", 0.0),
            ("red", 1.0),
            ("yellow", 2.0),
            ("notbuilt", 3.0),
            ("disabled", 4.0),
            ("aborted", 5.0),
            ("grey", 6.0),
        ];
        for (color, code) in table {
            assert_eq!(color_code(color), code, "{color}");
            assert_eq!(color_code(&format!("{color}_anime")), code, "{color}_anime");
        }
    }

    #[test]
    fn test_unrecognized_colors_are_unknown() {
        for color in ["", "green", "BLUE", "_anime", "blue_anime_anime"] {
            assert_eq!(color_code(color), UNKNOWN, "{color:?}");
        }
    }

    #[test]
    fn test_finished_results() {
        assert_eq!(finished_result_code("FAILURE"), Some(0.0));
        assert_eq!(finished_result_code("UNSTABLE"), Some(0.5));
        assert_eq!(finished_result_code("SUCCESS"), Some(1.0));
        assert_eq!(finished_result_code("ABORTED"), Some(2.0));
        assert_eq!(finished_result_code("NOT_BUILT"), None);
        assert_eq!(finished_result_code(""), None);
    }

    #[test]
    fn test_cause_classes() {
        assert_eq!(
            cause_class_code("hudson.triggers.TimerTrigger$TimerTriggerCause"),
            0.0
        );
        assert_eq!(cause_class_code("hudson.model.Cause$UserIdCause"), 1.0);
        assert_eq!(cause_class_code("jenkins.branch.BranchEventCause"), 10.0);
        assert_eq!(cause_class_code("com.example.SomeNewCause"), UNKNOWN);
    }

    #[test]
    fn test_cause_descriptions_match_on_prefix() {
        assert_eq!(cause_description_code("Started by timer"), 0.0);
        assert_eq!(cause_description_code("Started by user admin"), 1.0);
        assert_eq!(
            cause_description_code("Started by upstream project \"core\" build number 12"),
            2.0
        );
        assert_eq!(cause_description_code("Started by an SCM change"), 3.0);
        assert_eq!(cause_description_code("Started by remote host 10.0.0.1"), 7.0);
        assert_eq!(cause_description_code("Replayed #4"), UNKNOWN);
        assert_eq!(cause_description_code(""), UNKNOWN);
    }
}
