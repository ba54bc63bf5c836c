use super::entities::{CourseStatus, GradingScheme};
use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub status: Option<CourseStatus>,
}

/// 存储层课程列表查询；`member_id` 非空时只返回该用户加入的课程
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
    pub status: Option<CourseStatus>,
    pub member_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    /// 管理员代教师创建时必填；教师创建时忽略
    pub instructor_id: Option<i64>,
    pub major_id: Option<i64>,
    pub grading_scheme: Option<GradingScheme>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub major_id: Option<i64>,
    pub status: Option<CourseStatus>,
    pub grading_scheme: Option<GradingScheme>,
    #[serde(default)]
    pub regenerate_enrollment_key: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct EnrollRequest {
    pub enrollment_key: String,
}

/// 存储层新建课程所需的完整字段
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub instructor_id: i64,
    pub major_id: Option<i64>,
    pub enrollment_key: String,
    pub grading_scheme: GradingScheme,
}
