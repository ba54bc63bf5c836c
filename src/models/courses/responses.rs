use super::entities::Course;
use crate::models::course_users::entities::CourseRole;
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseDetailResponse {
    pub course: Course,
    pub instructor: Option<UserSummary>,
    /// 当前用户在课程中的角色，管理员未加入时为空
    pub my_role: Option<CourseRole>,
    pub member_count: u64,
}
