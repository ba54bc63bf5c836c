use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::{RequireJWT, require_jwt::user_cache_key};
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// 清除 refresh cookie，并使当前 access token 对应的用户缓存失效
pub async fn handle_logout(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let (Some(token), Some(cache)) = (
        RequireJWT::extract_bearer_token(request),
        request.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
    ) {
        cache.remove(&user_cache_key(&token)).await;
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::success_empty("Logged out")))
}
