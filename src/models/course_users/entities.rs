use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;

/// 课程内角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course_user.ts")]
pub enum CourseRole {
    Student,
    Assistant,
    Teacher,
}

define_string_enum!(CourseRole, "课程角色" {
    Student => STUDENT = "student",
    Assistant => ASSISTANT = "assistant",
    Teacher => TEACHER = "teacher",
});

impl CourseRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, CourseRole::Teacher | CourseRole::Assistant)
    }

    pub fn staff_roles() -> &'static [CourseRole] {
        &[Self::Teacher, Self::Assistant]
    }

    pub fn all_roles() -> &'static [CourseRole] {
        &[Self::Teacher, Self::Assistant, Self::Student]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course_user.ts")]
pub struct CourseUser {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub role: CourseRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
