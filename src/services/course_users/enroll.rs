use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseUserService;
use crate::models::{
    ApiResponse, ErrorCode,
    course_users::entities::CourseRole,
    courses::requests::EnrollRequest,
};
use crate::services::courses::normalize_enrollment_key;
use crate::services::permissions::{current_user, ensure_course_active};
use crate::services::{bad_request, conflict, internal_error, not_found};

pub async fn enroll(
    service: &CourseUserService,
    course_id: i64,
    body: EnrollRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(internal_error("Failed to load course", e)),
    };
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }

    let key = normalize_enrollment_key(&body.enrollment_key);
    if course.enrollment_key.as_deref() != Some(key.as_str()) {
        return Ok(bad_request(
            ErrorCode::EnrollmentKeyInvalid,
            "Invalid enrollment key",
        ));
    }

    match storage.get_course_user(course_id, user.id).await {
        Ok(Some(_)) => {
            return Ok(conflict(
                ErrorCode::CourseAlreadyJoined,
                "Already enrolled in this course",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to enroll", e)),
    }

    match storage
        .add_course_user(course_id, user.id, CourseRole::Student)
        .await
    {
        Ok(membership) => {
            info!("User {} enrolled in course {}", user.id, course.code);
            Ok(HttpResponse::Created().json(ApiResponse::success(membership, "Enrolled")))
        }
        Err(e) => Ok(internal_error("Failed to enroll", e)),
    }
}

pub async fn leave(
    service: &CourseUserService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(internal_error("Failed to load course", e)),
    };
    if course.instructor_id == user.id {
        return Ok(bad_request(
            ErrorCode::InstructorCannotLeave,
            "The instructor cannot leave the course",
        ));
    }

    match storage.remove_course_user(course_id, user.id).await {
        Ok(true) => {
            info!("User {} left course {}", user.id, course.code);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Left the course")))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::CourseUserNotFound,
            "Not enrolled in this course",
        )),
        Err(e) => Ok(internal_error("Failed to leave course", e)),
    }
}
