use super::entities::{Grade, ManualGrade};
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct GradebookEntry {
    pub student: UserSummary,
    pub grade: Grade,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct GradebookResponse {
    pub course_id: i64,
    pub entries: Vec<GradebookEntry>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct RecalculateResponse {
    pub course_id: i64,
    pub recalculated: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct ManualGradeListResponse {
    pub items: Vec<ManualGrade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct CountEntry {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct GradebookStatsResponse {
    pub course_id: i64,
    pub student_count: u64,
    pub graded_count: u64,
    pub average_grade: Option<f64>,
    pub letter_distribution: Vec<CountEntry>,
    pub status_distribution: Vec<CountEntry>,
}
