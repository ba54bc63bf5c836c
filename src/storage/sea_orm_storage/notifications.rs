use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    notifications::{
        entities::Notification,
        requests::{NewNotification, NotificationListQuery},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

fn to_active_model(req: NewNotification, now: i64) -> ActiveModel {
    ActiveModel {
        user_id: Set(req.user_id),
        notification_type: Set(req.notification_type.to_string()),
        title: Set(req.title),
        content: Set(req.content),
        reference_type: Set(req.reference_type.map(|t| t.to_string())),
        reference_id: Set(req.reference_id),
        is_read: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
}

impl SeaOrmStorage {
    pub async fn create_notification_impl(&self, req: NewNotification) -> Result<Notification> {
        let now = chrono::Utc::now().timestamp();

        let result = to_active_model(req, now)
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建通知失败: {e}")))?;

        Ok(result.into_notification())
    }

    /// 批量创建通知
    pub async fn create_notifications_impl(&self, reqs: Vec<NewNotification>) -> Result<u64> {
        if reqs.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let count = reqs.len() as u64;
        let models: Vec<ActiveModel> = reqs
            .into_iter()
            .map(|req| to_active_model(req, now))
            .collect();

        Notifications::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("批量创建通知失败: {e}")))?;

        Ok(count)
    }

    pub async fn get_notification_by_id_impl(&self, id: i64) -> Result<Option<Notification>> {
        let result = Notifications::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询通知失败: {e}")))?;

        Ok(result.map(|m| m.into_notification()))
    }

    pub async fn list_notifications_with_pagination_impl(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<PaginatedResponse<Notification>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Notifications::find().filter(Column::UserId.eq(user_id));

        if query.unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询通知总数失败: {e}")))?;

        let notifications = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            notifications
                .into_iter()
                .map(|m| m.into_notification())
                .collect(),
            page,
            size,
            total,
        ))
    }

    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<u64> {
        Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计未读通知失败: {e}")))
    }

    pub async fn mark_notification_read_impl(&self, id: i64) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_notifications_read_impl(&self, user_id: i64) -> Result<u64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("全部标记已读失败: {e}")))?;

        Ok(result.rows_affected)
    }

    pub async fn delete_notification_impl(&self, id: i64) -> Result<bool> {
        let result = Notifications::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除通知失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
