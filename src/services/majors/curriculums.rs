use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;

use super::MajorService;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::entities::CourseSummary,
    majors::{
        requests::{CreateCurriculumRequest, UpdateCurriculumRequest},
        responses::{CurriculumDetailResponse, CurriculumListResponse},
    },
};
use crate::services::{bad_request, internal_error, not_found};
use crate::storage::Storage;
use crate::utils::validate::validate_required_text;

/// 方案中的课程必须全部存在且不重复
async fn check_course_ids(
    storage: &Arc<dyn Storage>,
    course_ids: &[i64],
) -> Result<(), HttpResponse> {
    let mut unique = course_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.len() != course_ids.len() {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Curriculum contains duplicate courses",
        ));
    }
    if unique.is_empty() {
        return Ok(());
    }

    match storage.get_courses_by_ids(&unique).await {
        Ok(found) if found.len() == unique.len() => Ok(()),
        Ok(found) => {
            let missing: Vec<String> = unique
                .iter()
                .filter(|id| !found.iter().any(|c| c.id == **id))
                .map(|id| id.to_string())
                .collect();
            Err(bad_request(
                ErrorCode::CourseNotFound,
                format!("Courses not found: {}", missing.join(", ")),
            ))
        }
        Err(e) => Err(internal_error("Failed to check curriculum courses", e)),
    }
}

pub async fn list_curriculums(
    service: &MajorService,
    major_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_major_by_id(major_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::MajorNotFound, "Major not found")),
        Err(e) => return Ok(internal_error("Failed to get major", e)),
    }

    match storage.list_curriculums_by_major(major_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CurriculumListResponse { items },
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to list curriculums", e)),
    }
}

pub async fn get_curriculum(
    service: &MajorService,
    curriculum_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let curriculum = match storage.get_curriculum_by_id(curriculum_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return Ok(not_found(ErrorCode::CurriculumNotFound, "Curriculum not found")),
        Err(e) => return Ok(internal_error("Failed to get curriculum", e)),
    };

    let courses = match storage.get_courses_by_ids(&curriculum.course_ids).await {
        Ok(courses) => courses,
        Err(e) => return Ok(internal_error("Failed to load curriculum courses", e)),
    };
    let by_id: HashMap<i64, CourseSummary> = courses
        .iter()
        .map(|c| (c.id, CourseSummary::from(c)))
        .collect();

    // 按方案中的顺序展开，已删除的课程跳过
    let ordered = curriculum
        .course_ids
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CurriculumDetailResponse {
            curriculum,
            courses: ordered,
        },
        "Success",
    )))
}

pub async fn create_curriculum(
    service: &MajorService,
    major_id: i64,
    mut curriculum: CreateCurriculumRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_required_text("name", &curriculum.name, 100) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    curriculum.name = curriculum.name.trim().to_string();

    let storage = service.get_storage(request)?;

    match storage.get_major_by_id(major_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::MajorNotFound, "Major not found")),
        Err(e) => return Ok(internal_error("Failed to get major", e)),
    }

    if let Err(resp) = check_course_ids(&storage, &curriculum.course_ids).await {
        return Ok(resp);
    }

    match storage.create_curriculum(major_id, curriculum).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Curriculum created",
        ))),
        Err(e) => Ok(internal_error("Failed to create curriculum", e)),
    }
}

pub async fn update_curriculum(
    service: &MajorService,
    curriculum_id: i64,
    update: UpdateCurriculumRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = &update.name
        && let Err(msg) = validate_required_text("name", name, 100)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request)?;

    if let Some(course_ids) = &update.course_ids
        && let Err(resp) = check_course_ids(&storage, course_ids).await
    {
        return Ok(resp);
    }

    match storage.update_curriculum(curriculum_id, update).await {
        Ok(Some(c)) => Ok(HttpResponse::Ok().json(ApiResponse::success(c, "Curriculum updated"))),
        Ok(None) => Ok(not_found(ErrorCode::CurriculumNotFound, "Curriculum not found")),
        Err(e) => Ok(internal_error("Failed to update curriculum", e)),
    }
}

pub async fn delete_curriculum(
    service: &MajorService,
    curriculum_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match storage.delete_curriculum(curriculum_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Curriculum deleted"))),
        Ok(false) => Ok(not_found(ErrorCode::CurriculumNotFound, "Curriculum not found")),
        Err(e) => Ok(internal_error("Failed to delete curriculum", e)),
    }
}
