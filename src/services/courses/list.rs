use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;

use super::CourseService;
use crate::models::{
    ApiResponse,
    courses::requests::{CourseListParams, CourseListQuery},
    users::entities::UserRole,
};
use crate::services::internal_error;
use crate::services::permissions::current_user;

pub async fn list_courses(
    service: &CourseService,
    params: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (page, size) = params.pagination.normalized();
    let is_admin = user.role == UserRole::Admin;

    let query = CourseListQuery {
        page,
        size,
        search: params.search.filter(|s| !s.trim().is_empty()),
        status: params.status,
        member_id: (!is_admin).then_some(user.id),
    };

    let result = match storage.list_courses_with_pagination(query).await {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list courses", e)),
    };

    // 选课密钥只对本课程教学人员可见
    let staff_courses: HashSet<i64> = if is_admin {
        HashSet::new()
    } else {
        match storage.list_user_memberships(user.id).await {
            Ok(memberships) => memberships
                .into_iter()
                .filter(|m| m.role.is_staff())
                .map(|m| m.course_id)
                .collect(),
            Err(e) => return Ok(internal_error("Failed to list courses", e)),
        }
    };

    let result = result.map(|course| {
        if is_admin || staff_courses.contains(&course.id) {
            course
        } else {
            course.without_enrollment_key()
        }
    });

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Success")))
}
