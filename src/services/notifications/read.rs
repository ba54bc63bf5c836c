use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{NotificationService, load_owned};
use crate::models::{ApiResponse, notifications::responses::MarkAllReadResponse};
use crate::services::internal_error;
use crate::services::permissions::current_user;

pub async fn mark_read(
    service: &NotificationService,
    notification_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    if let Err(resp) = load_owned(&storage, notification_id, user.id).await {
        return Ok(resp);
    }

    match storage.mark_notification_read(notification_id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Marked as read"))),
        Err(e) => Ok(internal_error("Failed to mark notification", e)),
    }
}

pub async fn mark_all_read(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match storage.mark_all_notifications_read(user.id).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkAllReadResponse { updated },
            "All notifications marked as read",
        ))),
        Err(e) => Ok(internal_error("Failed to mark notifications", e)),
    }
}
