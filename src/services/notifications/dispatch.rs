//! 业务事件产生的站内通知
//!
//! 通知写入失败不影响主流程，只记录警告。

use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::notifications::{
    entities::{NotificationType, ReferenceType},
    requests::NewNotification,
};
use crate::storage::Storage;

pub(crate) async fn notify_user(storage: &Arc<dyn Storage>, notification: NewNotification) {
    let user_id = notification.user_id;
    if let Err(e) = storage.create_notification(notification).await {
        warn!("Failed to create notification for user {}: {}", user_id, e);
    }
}

/// 通知课程全部学生
pub(crate) async fn notify_course_students(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    notification_type: NotificationType,
    title: String,
    reference: (ReferenceType, i64),
) {
    let students = match storage.list_course_students(course_id).await {
        Ok(students) => students,
        Err(e) => {
            warn!("Failed to list students of course {}: {}", course_id, e);
            return;
        }
    };
    if students.is_empty() {
        return;
    }

    let batch: Vec<NewNotification> = students
        .iter()
        .map(|s| NewNotification {
            user_id: s.user_id,
            notification_type,
            title: title.clone(),
            content: None,
            reference_type: Some(reference.0),
            reference_id: Some(reference.1),
        })
        .collect();

    match storage.create_notifications(batch).await {
        Ok(count) => debug!("Sent {} notifications for course {}", count, course_id),
        Err(e) => warn!("Failed to notify students of course {}: {}", course_id, e),
    }
}
