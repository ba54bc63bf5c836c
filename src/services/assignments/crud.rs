use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
    courses::entities::GradeCategory,
    notifications::entities::{NotificationType, ReferenceType},
};
use crate::services::gradebook::refresh_course_grades;
use crate::services::modules::ensure_module_in_course;
use crate::services::notifications::dispatch::notify_course_students;
use crate::services::permissions::{current_user, ensure_course_active, require_course_staff};
use crate::services::{bad_request, forbidden, internal_error, not_found};
use crate::utils::validate::validate_required_text;

/// 作业字段的取值检查
pub(crate) fn validate_assignment_fields(
    title: Option<&str>,
    max_grade: Option<f64>,
    max_attempts: Option<i32>,
    category: Option<GradeCategory>,
) -> Result<(), String> {
    if let Some(title) = title {
        validate_required_text("title", title, 200)?;
    }
    if let Some(max_grade) = max_grade
        && !(max_grade.is_finite() && max_grade > 0.0)
    {
        return Err("max_grade must be greater than 0".to_string());
    }
    if let Some(max_attempts) = max_attempts
        && max_attempts <= 0
    {
        return Err("max_attempts must be greater than 0".to_string());
    }
    if category == Some(GradeCategory::Quizzes) {
        return Err("Assignments cannot use the quizzes category".to_string());
    }
    Ok(())
}

pub async fn create_assignment(
    service: &AssignmentService,
    course_id: i64,
    mut assignment: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_assignment_fields(
        Some(&assignment.title),
        Some(assignment.max_grade),
        assignment.max_attempts,
        assignment.category,
    ) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    assignment.title = assignment.title.trim().to_string();

    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }
    if let Some(module_id) = assignment.module_id
        && let Err(resp) = ensure_module_in_course(&storage, course_id, module_id).await
    {
        return Ok(resp);
    }

    let created = match storage
        .create_assignment(course_id, user.id, assignment)
        .await
    {
        Ok(a) => a,
        Err(e) => return Ok(internal_error("Failed to create assignment", e)),
    };

    info!(
        "Assignment {} created in course {} by user {}",
        created.id, course_id, user.id
    );

    notify_course_students(
        &storage,
        course_id,
        NotificationType::AssignmentPublished,
        format!("New assignment in {}: {}", course.name, created.title),
        (ReferenceType::Assignment, created.id),
    )
    .await;

    Ok(HttpResponse::Created().json(ApiResponse::success(created, "Assignment created")))
}

pub async fn get_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match load_assignment(&storage, &user, assignment_id).await {
        Ok((assignment, _, _)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "Success")))
        }
        Err(resp) => Ok(resp),
    }
}

pub async fn update_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    mut update: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_assignment_fields(
        update.title.as_deref(),
        update.max_grade,
        update.max_attempts,
        update.category,
    ) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    update.title = update.title.map(|t| t.trim().to_string());

    let storage = service.get_storage(request)?;
    let (assignment, course, access) = match load_assignment(&storage, &user, assignment_id).await
    {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ));
    }
    if let Some(module_id) = update.module_id
        && !update.clear_module
        && let Err(resp) = ensure_module_in_course(&storage, course.id, module_id).await
    {
        return Ok(resp);
    }

    // 分值或类别变化会影响已有成绩
    let affects_grades = update.max_grade.is_some_and(|g| g != assignment.max_grade)
        || update.category.is_some_and(|c| c != assignment.category);

    match storage.update_assignment(assignment_id, update).await {
        Ok(Some(updated)) => {
            if affects_grades {
                refresh_course_grades(&storage, &course).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Assignment updated")))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        )),
        Err(e) => Ok(internal_error("Failed to update assignment", e)),
    }
}

pub async fn delete_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (_, course, access) = match load_assignment(&storage, &user, assignment_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ));
    }

    match storage.delete_assignment(assignment_id).await {
        Ok(true) => {
            info!("Assignment {} deleted by user {}", assignment_id, user.id);
            refresh_course_grades(&storage, &course).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Assignment deleted")))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        )),
        Err(e) => Ok(internal_error("Failed to delete assignment", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_assignment_fields() {
        assert!(validate_assignment_fields(Some("Lab 1"), Some(10.0), Some(3), None).is_ok());
        assert!(validate_assignment_fields(Some("  "), Some(10.0), None, None).is_err());
        assert!(validate_assignment_fields(None, Some(0.0), None, None).is_err());
        assert!(validate_assignment_fields(None, Some(f64::NAN), None, None).is_err());
        assert!(validate_assignment_fields(None, None, Some(0), None).is_err());
        assert!(
            validate_assignment_fields(None, None, None, Some(GradeCategory::Quizzes)).is_err()
        );
        assert!(validate_assignment_fields(None, None, None, Some(GradeCategory::Final)).is_ok());
    }
}
