use super::entities::CourseRole;
use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course_user.ts")]
pub struct CourseUserListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<CourseRole>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseUserListQuery {
    pub page: u64,
    pub size: u64,
    pub role: Option<CourseRole>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course_user.ts")]
pub struct UpdateCourseUserRequest {
    pub role: CourseRole,
}
