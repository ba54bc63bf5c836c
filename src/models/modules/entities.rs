use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 课程单元
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "module.ts")]
pub struct CourseModule {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
