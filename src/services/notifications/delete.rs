use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{NotificationService, load_owned};
use crate::models::ApiResponse;
use crate::services::internal_error;
use crate::services::permissions::current_user;

pub async fn delete_notification(
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

    match storage.delete_notification(notification_id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Notification deleted"))),
        Err(e) => Ok(internal_error("Failed to delete notification", e)),
    }
}
