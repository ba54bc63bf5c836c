use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode, users::entities::UserRole};
use crate::services::permissions::{current_user, resolve_course_access};
use crate::services::{forbidden, internal_error, not_found};

pub async fn delete_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, _) = match resolve_course_access(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    if user.role != UserRole::Admin && course.instructor_id != user.id {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only the instructor can delete this course",
        ));
    }

    match storage.delete_course(course_id).await {
        Ok(true) => {
            info!("Course {} deleted by user {}", course.code, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted")))
        }
        Ok(false) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(internal_error("Failed to delete course", e)),
    }
}
