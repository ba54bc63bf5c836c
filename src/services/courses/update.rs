use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use super::create::unique_enrollment_key;
use crate::models::{ApiResponse, ErrorCode, courses::requests::UpdateCourseRequest};
use crate::services::gradebook::calculator::validate_scheme;
use crate::services::gradebook::refresh_course_grades;
use crate::services::permissions::{current_user, require_course_staff};
use crate::services::{bad_request, internal_error, not_found};
use crate::utils::validate::validate_required_text;

pub async fn update_course(
    service: &CourseService,
    course_id: i64,
    mut update: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    if let Some(name) = &update.name {
        if let Err(msg) = validate_required_text("name", name, 200) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        update.name = Some(name.trim().to_string());
    }
    if let Some(credits) = update.credits
        && credits <= 0
    {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "credits must be greater than 0",
        ));
    }
    if let Some(scheme) = &update.grading_scheme
        && let Err(msg) = validate_scheme(scheme)
    {
        return Ok(bad_request(ErrorCode::GradingSchemeInvalid, msg));
    }
    if let Some(major_id) = update.major_id {
        match storage.get_major_by_id(major_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(bad_request(ErrorCode::MajorNotFound, "Major not found")),
            Err(e) => return Ok(internal_error("Failed to load major", e)),
        }
    }

    let enrollment_key = if update.regenerate_enrollment_key {
        match unique_enrollment_key(&storage).await {
            Ok(key) => Some(key),
            Err(e) => return Ok(internal_error("Failed to update course", e)),
        }
    } else {
        None
    };

    let scheme_changed = update
        .grading_scheme
        .as_ref()
        .is_some_and(|scheme| *scheme != course.grading_scheme);

    match storage.update_course(course_id, update, enrollment_key).await {
        Ok(Some(updated)) => {
            if scheme_changed {
                info!("Grading scheme of course {} changed, recalculating", course_id);
                refresh_course_grades(&storage, &updated).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Course updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(internal_error("Failed to update course", e)),
    }
}
