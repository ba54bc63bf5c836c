use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;
use crate::models::courses::entities::GradeCategory;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "gradebook.ts")]
pub enum GradeItemSource {
    Assignment,
    Quiz,
    Manual,
}

define_string_enum!(GradeItemSource, "成绩来源" {
    Assignment => ASSIGNMENT = "assignment",
    Quiz => QUIZ = "quiz",
    Manual => MANUAL = "manual",
});

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "gradebook.ts")]
pub enum GradeStatus {
    Passing,
    AtRisk,
    Failing,
    Incomplete,
}

define_string_enum!(GradeStatus, "成绩状态" {
    Passing => PASSING = "passing",
    AtRisk => AT_RISK = "at_risk",
    Failing => FAILING = "failing",
    Incomplete => INCOMPLETE = "incomplete",
});

/// 成绩册中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct GradeItem {
    pub source: GradeItemSource,
    pub source_id: i64,
    pub title: String,
    pub category: GradeCategory,
    /// 未提交或未评分时为空，不计入总分
    pub earned: Option<f64>,
    pub possible: f64,
}

/// 学生在某课程的成绩汇总
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct Grade {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub items: Vec<GradeItem>,
    pub total_earned: f64,
    pub total_possible: f64,
    pub current_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub status: GradeStatus,
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}

/// 教师手动录入的成绩条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "gradebook.ts")]
pub struct ManualGrade {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub title: String,
    pub category: GradeCategory,
    pub earned: f64,
    pub possible: f64,
    pub comment: Option<String>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
