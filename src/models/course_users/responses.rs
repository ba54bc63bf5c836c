use super::entities::CourseRole;
use crate::models::courses::entities::CourseSummary;
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course_user.ts")]
pub struct CourseMember {
    pub user: UserSummary,
    pub role: CourseRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// 当前用户加入的课程
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course_user.ts")]
pub struct EnrolledCourse {
    pub course: CourseSummary,
    pub role: CourseRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}
