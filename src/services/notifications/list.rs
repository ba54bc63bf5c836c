use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::models::{
    ApiResponse,
    notifications::requests::{NotificationListParams, NotificationListQuery},
};
use crate::services::internal_error;
use crate::services::permissions::current_user;

pub async fn list_notifications(
    service: &NotificationService,
    params: NotificationListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (page, size) = params.pagination.normalized();

    let query = NotificationListQuery {
        page,
        size,
        unread_only: params.unread_only,
    };

    match storage.list_notifications_with_pagination(user.id, query).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Success"))),
        Err(e) => Ok(internal_error("Failed to list notifications", e)),
    }
}
