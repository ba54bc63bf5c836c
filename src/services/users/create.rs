use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::UserStatus,
        requests::{CreateUserRequest, NewUser},
    },
};
use crate::services::{bad_request, conflict, internal_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let username = user_data.username.trim().to_string();
    let email = user_data.email.trim().to_lowercase();

    // 验证用户名
    if let Err(msg) = validate_username(&username) {
        return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }

    if let Err(msg) = validate_password(&user_data.password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }

    let storage = service.get_storage(request)?;

    match storage.get_user_by_username(&username).await {
        Ok(Some(_)) => {
            return Ok(conflict(
                ErrorCode::UserNameAlreadyExists,
                "Username already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("User creation failed", e)),
    }
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(conflict(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("User creation failed", e)),
    }

    if let Some(major_id) = user_data.major_id {
        match storage.get_major_by_id(major_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(bad_request(ErrorCode::MajorNotFound, "Major not found")),
            Err(e) => return Ok(internal_error("User creation failed", e)),
        }
    }

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    let new_user = NewUser {
        username,
        email,
        password_hash,
        role: user_data.role,
        status: UserStatus::Active,
        display_name: user_data.display_name,
        major_id: user_data.major_id,
    };

    match storage.create_user(new_user).await {
        Ok(user) => {
            info!("User {} created with role {}", user.username, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "User created")))
        }
        Err(e) => Ok(internal_error("User creation failed", e)),
    }
}
