use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, normalize_enrollment_key};
use crate::models::{ApiResponse, ErrorCode, courses::entities::CourseSummary};
use crate::services::{internal_error, not_found};

pub async fn lookup_by_key(
    service: &CourseService,
    enrollment_key: String,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let key = normalize_enrollment_key(&enrollment_key);
    if key.is_empty() {
        return Ok(not_found(
            ErrorCode::EnrollmentKeyInvalid,
            "Invalid enrollment key",
        ));
    }

    let storage = service.get_storage(request)?;
    match storage.get_course_by_enrollment_key(&key).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseSummary::from(&course),
            "Success",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::EnrollmentKeyInvalid,
            "Invalid enrollment key",
        )),
        Err(e) => Ok(internal_error("Failed to look up course", e)),
    }
}
