use crate::models::courses::entities::GradeCategory;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct CreateManualGradeRequest {
    pub student_id: i64,
    pub title: String,
    pub category: GradeCategory,
    pub earned: f64,
    pub possible: f64,
    pub comment: Option<String>,
}

/// 存储层写入的成绩汇总
#[derive(Debug, Clone)]
pub struct GradeRecord {
    pub course_id: i64,
    pub student_id: i64,
    pub items: Vec<super::entities::GradeItem>,
    pub total_earned: f64,
    pub total_possible: f64,
    pub current_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub status: super::entities::GradeStatus,
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}
