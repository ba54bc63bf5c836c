use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::requests::UpdateUserRequest};
use crate::services::{bad_request, conflict, internal_error, not_found};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(email) = update_data.email.take() {
        let email = email.trim().to_lowercase();
        if let Err(msg) = validate_email(&email) {
            return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
        }
        match storage.get_user_by_email(&email).await {
            Ok(Some(other)) if other.id != user_id => {
                return Ok(conflict(
                    ErrorCode::UserEmailAlreadyExists,
                    "Email already exists",
                ));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_error("User update failed", e)),
        }
        update_data.email = Some(email);
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password(&password) {
            return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
        }
        update_data.password = match hash_password(&password) {
            Ok(hash) => Some(hash),
            Err(e) => return Ok(internal_error("Password hashing failed", e)),
        };
    }

    if let Some(major_id) = update_data.major_id {
        match storage.get_major_by_id(major_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(bad_request(ErrorCode::MajorNotFound, "Major not found")),
            Err(e) => return Ok(internal_error("User update failed", e)),
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User updated"))),
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            format!("User update failed: {}", e.message()),
        ))),
    }
}
