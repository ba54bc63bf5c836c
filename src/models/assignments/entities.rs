use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::courses::entities::GradeCategory;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub module_id: Option<i64>,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_grade: f64,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub allow_late: bool,
    pub category: GradeCategory,
    /// 为空表示不限提交次数
    pub max_attempts: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
