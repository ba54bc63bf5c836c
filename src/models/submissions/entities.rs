use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "submission.ts")]
pub enum SubmissionStatus {
    Submitted,
    Resubmitted,
    Graded,
    Returned,
}

define_string_enum!(SubmissionStatus, "提交状态" {
    Submitted => SUBMITTED = "submitted",
    Resubmitted => RESUBMITTED = "resubmitted",
    Graded => GRADED = "graded",
    Returned => RETURNED = "returned",
});

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub content: String,
    pub status: SubmissionStatus,
    pub is_late: bool,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}
