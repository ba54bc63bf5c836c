use super::SeaOrmStorage;
use crate::entity::course_users::{ActiveModel, Column, Entity as CourseUsers};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    course_users::{
        entities::{CourseRole, CourseUser},
        requests::CourseUserListQuery,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn add_course_user_impl(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<CourseUser> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("添加课程成员失败: {e}")))?;

        Ok(result.into_course_user())
    }

    pub async fn get_course_user_impl(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseUser>> {
        let result = CourseUsers::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程成员失败: {e}")))?;

        Ok(result.map(|m| m.into_course_user()))
    }

    /// 分页列出课程成员，搜索匹配用户名、邮箱与显示名
    pub async fn list_course_users_with_pagination_impl(
        &self,
        course_id: i64,
        query: CourseUserListQuery,
    ) -> Result<PaginatedResponse<CourseUser>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = CourseUsers::find().filter(Column::CourseId.eq(course_id));

        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            let user_ids: Vec<i64> = Users::find()
                .select_only()
                .column(UserColumn::Id)
                .filter(
                    Condition::any()
                        .add(UserColumn::Username.contains(&escaped))
                        .add(UserColumn::Email.contains(&escaped))
                        .add(UserColumn::DisplayName.contains(&escaped)),
                )
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| LmsError::database_operation(format!("搜索用户失败: {e}")))?;

            if user_ids.is_empty() {
                return Ok(PaginatedResponse::new(Vec::new(), page, size, 0));
            }

            select = select.filter(Column::UserId.is_in(user_ids));
        }

        select = select.order_by_asc(Column::JoinedAt).order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程成员总数失败: {e}")))?;

        let members = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程成员列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            members.into_iter().map(|m| m.into_course_user()).collect(),
            page,
            size,
            total,
        ))
    }

    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<CourseUser>> {
        let result = CourseUsers::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Role.eq(CourseRole::Student.to_string()))
            .order_by_asc(Column::UserId)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程学生失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_course_user()).collect())
    }

    pub async fn list_user_memberships_impl(&self, user_id: i64) -> Result<Vec<CourseUser>> {
        let result = CourseUsers::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::JoinedAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户课程失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_course_user()).collect())
    }

    pub async fn update_course_user_role_impl(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<Option<CourseUser>> {
        let result = CourseUsers::update_many()
            .col_expr(Column::Role, sea_orm::sea_query::Expr::value(role.to_string()))
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新成员角色失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_course_user_impl(course_id, user_id).await
    }

    pub async fn remove_course_user_impl(&self, course_id: i64, user_id: i64) -> Result<bool> {
        let result = CourseUsers::delete_many()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("移除课程成员失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_course_users_impl(&self, course_id: i64) -> Result<u64> {
        CourseUsers::find()
            .filter(Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计课程成员失败: {e}")))
    }
}
