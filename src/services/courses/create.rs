use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::CourseService;
use crate::config::AppConfig;
use crate::errors::LmsError;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{
        entities::GradingScheme,
        requests::{CreateCourseRequest, NewCourse},
    },
    users::entities::UserRole,
};
use crate::services::gradebook::calculator::validate_scheme;
use crate::services::permissions::current_user;
use crate::services::{bad_request, conflict, forbidden, internal_error};
use crate::storage::Storage;
use crate::utils::random_code::generate_enrollment_key;
use crate::utils::validate::{validate_code, validate_required_text};

const MAX_KEY_ATTEMPTS: usize = 5;

/// 生成未被占用的选课密钥
pub(crate) async fn unique_enrollment_key(storage: &Arc<dyn Storage>) -> Result<String, LmsError> {
    for _ in 0..MAX_KEY_ATTEMPTS {
        let key = generate_enrollment_key();
        if storage.get_course_by_enrollment_key(&key).await?.is_none() {
            return Ok(key);
        }
    }
    Err(LmsError::conflict("Failed to generate a unique enrollment key"))
}

pub async fn create_course(
    service: &CourseService,
    course: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let code = course.code.trim().to_uppercase();
    if let Err(msg) = validate_code(&code) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) = validate_required_text("name", &course.name, 200) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if course.credits <= 0 {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "credits must be greater than 0",
        ));
    }

    let grading_scheme = course
        .grading_scheme
        .unwrap_or_else(|| GradingScheme::from(&AppConfig::get().grading));
    if let Err(msg) = validate_scheme(&grading_scheme) {
        return Ok(bad_request(ErrorCode::GradingSchemeInvalid, msg));
    }

    let storage = service.get_storage(request)?;

    let instructor_id = match user.role {
        UserRole::Teacher => user.id,
        UserRole::Admin => {
            let Some(instructor_id) = course.instructor_id else {
                return Ok(bad_request(
                    ErrorCode::BadRequest,
                    "instructor_id is required when an admin creates a course",
                ));
            };
            match storage.get_user_by_id(instructor_id).await {
                Ok(Some(instructor)) if instructor.role == UserRole::Teacher => instructor_id,
                Ok(Some(_)) => {
                    return Ok(bad_request(
                        ErrorCode::BadRequest,
                        "Instructor must be a teacher",
                    ));
                }
                Ok(None) => {
                    return Ok(bad_request(ErrorCode::UserNotFound, "Instructor not found"));
                }
                Err(e) => return Ok(internal_error("Failed to load instructor", e)),
            }
        }
        UserRole::Student => {
            return Ok(forbidden(
                ErrorCode::Forbidden,
                "Only teachers and admins can create courses",
            ));
        }
    };

    match storage.get_course_by_code(&code).await {
        Ok(Some(_)) => {
            return Ok(conflict(
                ErrorCode::CourseAlreadyExists,
                "Course code already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to create course", e)),
    }

    if let Some(major_id) = course.major_id {
        match storage.get_major_by_id(major_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(bad_request(ErrorCode::MajorNotFound, "Major not found")),
            Err(e) => return Ok(internal_error("Failed to load major", e)),
        }
    }

    let enrollment_key = match unique_enrollment_key(&storage).await {
        Ok(key) => key,
        Err(e) => return Ok(internal_error("Failed to create course", e)),
    };

    let new_course = NewCourse {
        code,
        name: course.name.trim().to_string(),
        description: course.description,
        credits: course.credits,
        instructor_id,
        major_id: course.major_id,
        enrollment_key,
        grading_scheme,
    };

    match storage.create_course(new_course).await {
        Ok(course) => {
            info!(
                "Course {} created by user {} (instructor {})",
                course.code, user.id, course.instructor_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(course, "Course created")))
        }
        Err(e) => Ok(internal_error("Failed to create course", e)),
    }
}
