use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct Major {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 培养方案：某专业某年级的有序课程列表
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct Curriculum {
    pub id: i64,
    pub major_id: i64,
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub course_ids: Vec<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
