//! Element identifiers the consolidation fold gives meaning to.
//!
//! Both SCORM 1.2 and SCORM 2004 spellings are recognised; every other
//! element is stored without interpretation.

/// SCORM 1.2 lesson status.
pub const LESSON_STATUS_12: &str = "cmi.core.lesson_status";
/// SCORM 2004 completion status.
pub const COMPLETION_STATUS_2004: &str = "cmi.completion_status";
/// SCORM 2004 success status.
pub const SUCCESS_STATUS_2004: &str = "cmi.success_status";
/// SCORM 1.2 raw score.
pub const SCORE_RAW_12: &str = "cmi.core.score.raw";
/// SCORM 2004 raw score.
pub const SCORE_RAW_2004: &str = "cmi.score.raw";

/// Returns `true` for elements carrying a completion status.
#[must_use]
pub fn is_completion_element(element_id: &str) -> bool {
    matches!(element_id, LESSON_STATUS_12 | COMPLETION_STATUS_2004)
}

/// Returns `true` for elements carrying a raw score.
#[must_use]
pub fn is_score_element(element_id: &str) -> bool {
    matches!(element_id, SCORE_RAW_12 | SCORE_RAW_2004)
}

/// Success status implied by a SCORM 1.2 lesson status, if any.
///
/// SCORM 1.2 folds success into `lesson_status`; `passed` and `failed` are
/// the only values that say anything about it.
#[must_use]
pub fn success_from_lesson_status(value: &str) -> Option<&'static str> {
    match value.trim() {
        "passed" => Some("passed"),
        "failed" => Some("failed"),
        _ => None,
    }
}
