use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use tracing::info;

use super::GradebookService;
use super::recalculate::{ensure_course_student, refresh_student_grade};
use crate::models::{
    ApiResponse, ErrorCode,
    gradebook::{requests::CreateManualGradeRequest, responses::ManualGradeListResponse},
};
use crate::services::permissions::{current_user, require_course_staff};
use crate::services::{bad_request, internal_error, not_found};
use crate::utils::validate::validate_required_text;

#[derive(Debug, Deserialize)]
pub struct ManualGradeListParams {
    pub student_id: Option<i64>,
}

/// 手动成绩的数值规则
pub fn validate_manual_entry(entry: &CreateManualGradeRequest) -> Result<(), String> {
    validate_required_text("title", &entry.title, 200)?;
    if !entry.possible.is_finite() || entry.possible <= 0.0 {
        return Err("Possible points must be greater than 0".to_string());
    }
    if !entry.earned.is_finite() || entry.earned < 0.0 || entry.earned > entry.possible {
        return Err(format!(
            "Earned points must be between 0 and {}",
            entry.possible
        ));
    }
    Ok(())
}

pub async fn list_manual_grades(
    service: &GradebookService,
    course_id: i64,
    params: ManualGradeListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    if let Err(resp) = require_course_staff(&storage, &user, course_id).await {
        return Ok(resp);
    }

    match storage.list_manual_grades(course_id, params.student_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ManualGradeListResponse { items },
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to list manual grades", e)),
    }
}

pub async fn create_manual_grade(
    service: &GradebookService,
    course_id: i64,
    mut entry: CreateManualGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_manual_entry(&entry) {
        return Ok(bad_request(ErrorCode::GradeOutOfRange, msg));
    }
    entry.title = entry.title.trim().to_string();

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_student(&storage, course_id, entry.student_id).await {
        return Ok(resp);
    }

    match storage.create_manual_grade(course_id, user.id, entry).await {
        Ok(created) => {
            info!(
                "Manual grade {} added for student {} in course {}",
                created.id, created.student_id, course_id
            );
            refresh_student_grade(&storage, &course, created.student_id).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(created, "Manual grade created")))
        }
        Err(e) => Ok(internal_error("Failed to create manual grade", e)),
    }
}

pub async fn delete_manual_grade(
    service: &GradebookService,
    course_id: i64,
    entry_id: i64,
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

    let entry = match storage.get_manual_grade_by_id(entry_id).await {
        Ok(Some(entry)) if entry.course_id == course_id => entry,
        Ok(_) => {
            return Ok(not_found(
                ErrorCode::ManualGradeNotFound,
                "Manual grade not found",
            ));
        }
        Err(e) => return Ok(internal_error("Failed to load manual grade", e)),
    };

    match storage.delete_manual_grade(entry.id).await {
        Ok(_) => {
            refresh_student_grade(&storage, &course, entry.student_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Manual grade deleted")))
        }
        Err(e) => Ok(internal_error("Failed to delete manual grade", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradeCategory;

    fn entry(earned: f64, possible: f64) -> CreateManualGradeRequest {
        CreateManualGradeRequest {
            student_id: 3,
            title: "Participation".into(),
            category: GradeCategory::Assignments,
            earned,
            possible,
            comment: None,
        }
    }

    #[test]
    fn test_manual_entry_bounds() {
        assert!(validate_manual_entry(&entry(8.0, 10.0)).is_ok());
        assert!(validate_manual_entry(&entry(10.0, 10.0)).is_ok());
        assert!(validate_manual_entry(&entry(11.0, 10.0)).is_err());
        assert!(validate_manual_entry(&entry(-1.0, 10.0)).is_err());
        assert!(validate_manual_entry(&entry(0.0, 0.0)).is_err());
    }
}
