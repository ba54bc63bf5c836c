use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AuthService;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::requests::RegisterRequest,
    users::{
        entities::{UserRole, UserStatus},
        requests::NewUser,
    },
};
use crate::services::{bad_request, conflict, internal_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let username = register_request.username.trim().to_string();
    let email = register_request.email.trim().to_lowercase();

    if let Err(msg) = validate_username(&username) {
        return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
    }
    if let Err(msg) = validate_email(&email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    if let Err(msg) = validate_password(&register_request.password) {
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
        Err(e) => return Ok(internal_error("Registration failed", e)),
    }
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(conflict(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Registration failed", e)),
    }

    if let Some(major_id) = register_request.major_id {
        match storage.get_major_by_id(major_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(bad_request(ErrorCode::MajorNotFound, "Major not found")),
            Err(e) => return Ok(internal_error("Registration failed", e)),
        }
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    let new_user = NewUser {
        username,
        email,
        password_hash,
        role: UserRole::Student,
        status: UserStatus::Active,
        display_name: register_request
            .display_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        major_id: register_request.major_id,
    };

    match storage.create_user(new_user).await {
        Ok(user) => {
            info!("User {} registered (ID: {})", user.username, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "Registration successful")))
        }
        Err(e) => {
            error!("User registration failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("Registration failed: {}", e.message()),
            )))
        }
    }
}
