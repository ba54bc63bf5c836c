use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::GradebookService;
use super::recalculate::{ensure_course_student, recalculate_student, settle_expired_attempts};
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::entities::Course,
    gradebook::{
        entities::Grade,
        responses::{GradebookEntry, GradebookResponse},
    },
};
use crate::services::permissions::{current_user, require_course_staff, resolve_course_access};
use crate::services::{forbidden, internal_error, load_user_summaries};
use crate::storage::Storage;

/// 已存储的成绩；从未计算过时当场计算并写入
async fn stored_or_computed(
    storage: &Arc<dyn Storage>,
    course: &Course,
    student_id: i64,
) -> Result<Grade> {
    settle_expired_attempts(storage, course, Some(student_id)).await?;
    match storage.get_grade(course.id, student_id).await? {
        Some(grade) => Ok(grade),
        None => recalculate_student(storage, course, student_id).await,
    }
}

pub async fn get_gradebook(
    service: &GradebookService,
    course_id: i64,
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

    if let Err(e) = settle_expired_attempts(&storage, &course, None).await {
        return Ok(internal_error("Failed to finalize expired quiz attempts", e));
    }
    let students = match storage.list_course_students(course.id).await {
        Ok(s) => s,
        Err(e) => return Ok(internal_error("Failed to list students", e)),
    };
    let mut grades: HashMap<i64, Grade> = match storage.list_course_grades(course.id).await {
        Ok(grades) => grades.into_iter().map(|g| (g.student_id, g)).collect(),
        Err(e) => return Ok(internal_error("Failed to list grades", e)),
    };

    let student_ids: Vec<i64> = students.iter().map(|s| s.user_id).collect();
    let summaries = match load_user_summaries(&storage, &student_ids).await {
        Ok(s) => s,
        Err(e) => return Ok(internal_error("Failed to load students", e)),
    };

    let mut entries = Vec::with_capacity(students.len());
    for student_id in student_ids {
        let grade = match grades.remove(&student_id) {
            Some(grade) => grade,
            None => match recalculate_student(&storage, &course, student_id).await {
                Ok(grade) => grade,
                Err(e) => {
                    warn!(
                        "Skipping student {} in gradebook of course {}: {}",
                        student_id, course.id, e
                    );
                    continue;
                }
            },
        };
        if let Some(student) = summaries.get(&student_id) {
            entries.push(GradebookEntry {
                student: student.clone(),
                grade,
            });
        }
    }
    entries.sort_by(|a, b| a.student.username.cmp(&b.student.username));

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GradebookResponse {
            course_id: course.id,
            entries,
        },
        "Success",
    )))
}

pub async fn get_student_grade(
    service: &GradebookService,
    course_id: i64,
    student_id: i64,
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
    if let Err(resp) = ensure_course_student(&storage, course_id, student_id).await {
        return Ok(resp);
    }

    match stored_or_computed(&storage, &course, student_id).await {
        Ok(grade) => Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Success"))),
        Err(e) => Ok(internal_error("Failed to load grade", e)),
    }
}

pub async fn get_my_grade(
    service: &GradebookService,
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
    if !access.is_student() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only students of this course have a grade",
        ));
    }

    match stored_or_computed(&storage, &course, user.id).await {
        Ok(grade) => Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Success"))),
        Err(e) => Ok(internal_error("Failed to load grade", e)),
    }
}
