use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{ApiResponse, courses::responses::CourseDetailResponse};
use crate::services::permissions::{current_user, resolve_course_access};
use crate::services::{internal_error, load_user_summaries};

pub async fn get_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, access) = match resolve_course_access(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let member_count = match storage.count_course_users(course_id).await {
        Ok(count) => count,
        Err(e) => return Ok(internal_error("Failed to count course members", e)),
    };
    let mut instructors = match load_user_summaries(&storage, &[course.instructor_id]).await {
        Ok(map) => map,
        Err(e) => return Ok(internal_error("Failed to load instructor", e)),
    };

    let course = if access.is_staff() {
        course
    } else {
        course.without_enrollment_key()
    };

    let response = CourseDetailResponse {
        instructor: instructors.remove(&course.instructor_id),
        my_role: access.course_role(),
        member_count,
        course,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Success")))
}
