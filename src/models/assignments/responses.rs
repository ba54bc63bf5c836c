use super::entities::Assignment;
use crate::models::submissions::entities::SubmissionStatus;
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

/// 学生视角的作业列表项，附带本人最新提交状态
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    pub my_status: Option<SubmissionStatus>,
    pub my_grade: Option<f64>,
    pub attempts_used: i32,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentStatsResponse {
    pub assignment_id: i64,
    pub total_students: u64,
    pub submitted_count: u64,
    pub graded_count: u64,
    pub late_count: u64,
    pub submission_rate: f64,
    pub score_stats: Option<ScoreStats>,
    pub unsubmitted_students: Vec<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct ScoreStats {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
}
