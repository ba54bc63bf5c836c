use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::UserService;
use crate::models::{
    ApiResponse,
    course_users::responses::EnrolledCourse,
    courses::entities::{Course, CourseSummary},
};
use crate::services::internal_error;
use crate::services::permissions::current_user;

/// 由成员关系推导出的已加入课程列表，按加入时间倒序
pub async fn list_my_courses(
    service: &UserService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let memberships = match storage.list_user_memberships(user.id).await {
        Ok(m) => m,
        Err(e) => return Ok(internal_error("Failed to list memberships", e)),
    };

    let course_ids: Vec<i64> = memberships.iter().map(|m| m.course_id).collect();
    let courses: HashMap<i64, Course> = match storage.get_courses_by_ids(&course_ids).await {
        Ok(courses) => courses.into_iter().map(|c| (c.id, c)).collect(),
        Err(e) => return Ok(internal_error("Failed to load courses", e)),
    };

    let mut items: Vec<EnrolledCourse> = memberships
        .into_iter()
        .filter_map(|m| {
            courses.get(&m.course_id).map(|course| EnrolledCourse {
                course: CourseSummary::from(course),
                role: m.role,
                joined_at: m.joined_at,
            })
        })
        .collect();
    items.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));

    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "Success")))
}
