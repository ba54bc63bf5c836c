use crate::models::common::pagination::PaginationQuery;
use crate::models::courses::entities::GradeCategory;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub module_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentListQuery {
    pub page: u64,
    pub size: u64,
    pub module_id: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub module_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub max_grade: f64,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub allow_late: bool,
    pub category: Option<GradeCategory>,
    pub max_attempts: Option<i32>,
}

/// 更新作业；`clear_*` 用于把可空字段显式置空
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub module_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub max_grade: Option<f64>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub allow_late: Option<bool>,
    pub category: Option<GradeCategory>,
    pub max_attempts: Option<i32>,
    #[serde(default)]
    pub clear_due_date: bool,
    #[serde(default)]
    pub clear_max_attempts: bool,
    #[serde(default)]
    pub clear_module: bool,
}
