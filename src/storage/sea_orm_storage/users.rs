use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    users::{
        entities::User,
        requests::{NewUser, UpdateUserRequest, UserListQuery},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, sea_query::Expr,
};

fn query_failed(e: sea_orm::DbErr) -> LmsError {
    LmsError::database_operation(format!("查询用户失败: {e}"))
}

/// 列表筛选：关键字匹配用户名、邮箱、显示名
fn list_condition(query: &UserListQuery) -> Condition {
    let mut cond = Condition::all();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let escaped = escape_like_pattern(search);
        cond = cond.add(
            Condition::any()
                .add(Column::Username.contains(&escaped))
                .add(Column::Email.contains(&escaped))
                .add(Column::DisplayName.contains(&escaped)),
        );
    }
    if let Some(role) = query.role {
        cond = cond.add(Column::Role.eq(role.to_string()));
    }
    if let Some(status) = query.status {
        cond = cond.add(Column::Status.eq(status.to_string()));
    }
    cond
}

impl SeaOrmStorage {
    async fn find_user_where(&self, cond: Condition) -> Result<Option<User>> {
        Users::find()
            .filter(cond)
            .one(&self.db)
            .await
            .map(|m| m.map(|m| m.into_user()))
            .map_err(query_failed)
    }

    pub async fn create_user_impl(&self, req: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            role: Set(req.role.to_string()),
            status: Set(req.status.to_string()),
            display_name: Set(req.display_name),
            avatar_url: Set(None),
            major_id: Set(req.major_id),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map(|m| m.into_user())
        .map_err(|e| LmsError::database_operation(format!("创建用户失败: {e}")))
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        self.find_user_where(Condition::all().add(Column::Id.eq(id)))
            .await
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        self.find_user_where(Condition::all().add(Column::Username.eq(username)))
            .await
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        self.find_user_where(Condition::all().add(Column::Email.eq(email)))
            .await
    }

    /// 登录标识可以是用户名或邮箱
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        self.find_user_where(
            Condition::any()
                .add(Column::Username.eq(identifier))
                .add(Column::Email.eq(identifier)),
        )
        .await
    }

    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map(|rows| rows.into_iter().map(|m| m.into_user()).collect())
            .map_err(query_failed)
    }

    /// 按创建时间倒序分页
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<PaginatedResponse<User>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let paginator = Users::find()
            .filter(list_condition(&query))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator.num_items().await.map_err(query_failed)?;
        let rows = paginator.fetch_page(page - 1).await.map_err(query_failed)?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(|m| m.into_user()).collect(),
            page,
            size,
            total,
        ))
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 只写入请求中给出的字段；用户不存在时返回 None
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_failed)?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = update.password {
            model.password_hash = Set(password_hash);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if update.display_name.is_some() {
            model.display_name = Set(update.display_name);
        }
        if update.avatar_url.is_some() {
            model.avatar_url = Set(update.avatar_url);
        }
        if update.major_id.is_some() {
            model.major_id = Set(update.major_id);
        }

        model
            .update(&self.db)
            .await
            .map(|m| Some(m.into_user()))
            .map_err(|e| LmsError::database_operation(format!("更新用户失败: {e}")))
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map(|r| r.rows_affected > 0)
            .map_err(|e| LmsError::database_operation(format!("删除用户失败: {e}")))
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计用户数量失败: {e}")))
    }
}
