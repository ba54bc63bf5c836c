use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use crate::cache::ObjectCache;
use crate::middlewares::{RequireJWT, require_jwt::user_cache_key};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::requests::UpdateProfileRequest,
    users::requests::UpdateUserRequest,
};
use crate::services::permissions::current_user;
use crate::services::{bad_request, internal_error, not_found};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{validate_password, validate_required_text};

use super::AuthService;

pub async fn handle_get_me(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 缓存中的用户可能是旧数据，这里读库
    let storage = service.get_storage(request)?;
    match storage.get_user_by_id(user.id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(user, "Success"))),
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(internal_error("Failed to load user", e)),
    }
}

pub async fn handle_update_profile(
    service: &AuthService,
    update_request: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    if let Some(display_name) = &update_request.display_name
        && let Err(msg) = validate_required_text("display_name", display_name, 64)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let mut update = UpdateUserRequest {
        display_name: update_request.display_name.map(|s| s.trim().to_string()),
        avatar_url: update_request.avatar_url,
        ..Default::default()
    };

    if let Some(new_password) = update_request.new_password {
        // 修改密码需要当前密码
        let stored = match storage.get_user_by_id(user.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
            Err(e) => return Ok(internal_error("Failed to load user", e)),
        };
        let current_ok = update_request
            .current_password
            .as_deref()
            .is_some_and(|current| verify_password(current, &stored.password_hash));
        if !current_ok {
            return Ok(bad_request(
                ErrorCode::UserPasswordInvalid,
                "Current password is incorrect",
            ));
        }
        if let Err(msg) = validate_password(&new_password) {
            return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
        }
        update.password = match hash_password(&new_password) {
            Ok(hash) => Some(hash),
            Err(e) => return Ok(internal_error("Password hashing failed", e)),
        };
    }

    match storage.update_user(user.id, update).await {
        Ok(Some(updated)) => {
            if let (Some(token), Some(cache)) = (
                RequireJWT::extract_bearer_token(request),
                request.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
            ) {
                cache.remove(&user_cache_key(&token)).await;
            }
            info!("User {} updated profile", updated.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Profile updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(internal_error("Failed to update profile", e)),
    }
}
