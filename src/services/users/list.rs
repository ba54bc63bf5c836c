use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse,
    users::{
        requests::{UserListParams, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::services::internal_error;

pub async fn list_users(
    service: &UserService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let (page, size) = query.pagination.normalized();

    let list_query = UserListQuery {
        page,
        size,
        role: query.role,
        status: query.status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    match storage.list_users_with_pagination(list_query).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserListResponse {
                items: result.items,
                pagination: result.pagination,
            },
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to list users", e)),
    }
}
