use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct CreateSubmissionRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeSubmissionRequest {
    pub grade: f64,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct ReturnSubmissionRequest {
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 为 true 时返回全部历史提交，否则每个学生只返回最新一次
    #[serde(default)]
    pub history: bool,
    pub student_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub page: u64,
    pub size: u64,
    pub latest_only: bool,
    pub student_id: Option<i64>,
}

/// 存储层新建提交
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub content: String,
    pub status: crate::models::submissions::entities::SubmissionStatus,
    pub is_late: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}
