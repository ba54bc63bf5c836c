pub mod count;
pub mod delete;
pub mod dispatch;
pub mod list;
pub mod read;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::notifications::requests::NotificationListParams;
use crate::storage::Storage;

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

impl NotificationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_notifications(
        &self,
        params: NotificationListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_notifications(self, params, request).await
    }

    pub async fn unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        count::unread_count(self, request).await
    }

    pub async fn mark_read(
        &self,
        notification_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        read::mark_read(self, notification_id, request).await
    }

    pub async fn mark_all_read(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        read::mark_all_read(self, request).await
    }

    pub async fn delete_notification(
        &self,
        notification_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_notification(self, notification_id, request).await
    }
}

/// 读取通知并校验归属
pub(crate) async fn load_owned(
    storage: &Arc<dyn Storage>,
    notification_id: i64,
    user_id: i64,
) -> Result<crate::models::notifications::entities::Notification, HttpResponse> {
    use crate::models::ErrorCode;
    use crate::services::{forbidden, internal_error, not_found};

    match storage.get_notification_by_id(notification_id).await {
        Ok(Some(n)) if n.user_id == user_id => Ok(n),
        Ok(Some(_)) => Err(forbidden(
            ErrorCode::Forbidden,
            "You can only access your own notifications",
        )),
        Ok(None) => Err(not_found(
            ErrorCode::NotificationNotFound,
            "Notification not found",
        )),
        Err(e) => Err(internal_error("Failed to load notification", e)),
    }
}
