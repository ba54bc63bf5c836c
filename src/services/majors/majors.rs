use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MajorService;
use crate::models::{
    ApiResponse, ErrorCode,
    majors::{
        requests::{CreateMajorRequest, UpdateMajorRequest},
        responses::MajorListResponse,
    },
};
use crate::services::{bad_request, conflict, internal_error, not_found};
use crate::utils::validate::{validate_code, validate_required_text};

pub async fn list_majors(
    service: &MajorService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match storage.list_majors().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MajorListResponse { items },
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to list majors", e)),
    }
}

pub async fn get_major(
    service: &MajorService,
    major_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match storage.get_major_by_id(major_id).await {
        Ok(Some(major)) => Ok(HttpResponse::Ok().json(ApiResponse::success(major, "Success"))),
        Ok(None) => Ok(not_found(ErrorCode::MajorNotFound, "Major not found")),
        Err(e) => Ok(internal_error("Failed to get major", e)),
    }
}

pub async fn create_major(
    service: &MajorService,
    mut major: CreateMajorRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    major.code = major.code.trim().to_uppercase();
    if let Err(msg) = validate_code(&major.code) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) = validate_required_text("name", &major.name, 100) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    major.name = major.name.trim().to_string();

    let storage = service.get_storage(request)?;

    // 专业代码唯一
    match storage.list_majors().await {
        Ok(existing) if existing.iter().any(|m| m.code == major.code) => {
            return Ok(conflict(
                ErrorCode::MajorAlreadyExists,
                "Major code already exists",
            ));
        }
        Ok(_) => {}
        Err(e) => return Ok(internal_error("Failed to create major", e)),
    }

    match storage.create_major(major).await {
        Ok(major) => {
            info!("Major {} created", major.code);
            Ok(HttpResponse::Created().json(ApiResponse::success(major, "Major created")))
        }
        Err(e) => Ok(internal_error("Failed to create major", e)),
    }
}

pub async fn update_major(
    service: &MajorService,
    major_id: i64,
    mut update: UpdateMajorRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(name) = &update.name
        && let Err(msg) = validate_required_text("name", name, 100)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    if let Some(code) = update.code.take() {
        let code = code.trim().to_uppercase();
        if let Err(msg) = validate_code(&code) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        match storage.list_majors().await {
            Ok(existing) if existing.iter().any(|m| m.code == code && m.id != major_id) => {
                return Ok(conflict(
                    ErrorCode::MajorAlreadyExists,
                    "Major code already exists",
                ));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_error("Failed to update major", e)),
        }
        update.code = Some(code);
    }

    match storage.update_major(major_id, update).await {
        Ok(Some(major)) => Ok(HttpResponse::Ok().json(ApiResponse::success(major, "Major updated"))),
        Ok(None) => Ok(not_found(ErrorCode::MajorNotFound, "Major not found")),
        Err(e) => Ok(internal_error("Failed to update major", e)),
    }
}

pub async fn delete_major(
    service: &MajorService,
    major_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match storage.delete_major(major_id).await {
        Ok(true) => {
            info!("Major {} deleted", major_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Major deleted")))
        }
        Ok(false) => Ok(not_found(ErrorCode::MajorNotFound, "Major not found")),
        Err(e) => Ok(internal_error("Failed to delete major", e)),
    }
}
