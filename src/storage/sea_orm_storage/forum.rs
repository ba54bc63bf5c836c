use super::SeaOrmStorage;
use crate::entity::comments::{
    ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comments,
};
use crate::entity::forum_posts::{ActiveModel, Column, Entity as ForumPosts};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    forum::{
        entities::{Comment, ForumPost},
        requests::{CreateCommentRequest, CreatePostRequest, PostListQuery, UpdatePostRequest},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_post_impl(
        &self,
        course_id: i64,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<ForumPost> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            author_id: Set(author_id),
            title: Set(req.title),
            content: Set(req.content),
            is_pinned: Set(false),
            is_locked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建帖子失败: {e}")))?;

        Ok(result.into_post())
    }

    pub async fn get_post_by_id_impl(&self, id: i64) -> Result<Option<ForumPost>> {
        let result = ForumPosts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询帖子失败: {e}")))?;

        Ok(result.map(|m| m.into_post()))
    }

    pub async fn list_posts_with_pagination_impl(
        &self,
        course_id: i64,
        query: PostListQuery,
    ) -> Result<PaginatedResponse<ForumPost>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = ForumPosts::find().filter(Column::CourseId.eq(course_id));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::Content.contains(&escaped)),
            );
        }

        select = select
            .order_by_desc(Column::IsPinned)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询帖子总数失败: {e}")))?;

        let posts = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询帖子列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            posts.into_iter().map(|m| m.into_post()).collect(),
            page,
            size,
            total,
        ))
    }

    pub async fn update_post_impl(
        &self,
        id: i64,
        update: UpdatePostRequest,
    ) -> Result<Option<ForumPost>> {
        if self.get_post_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(content) = update.content {
            model.content = Set(content);
        }

        if let Some(is_pinned) = update.is_pinned {
            model.is_pinned = Set(is_pinned);
        }

        if let Some(is_locked) = update.is_locked {
            model.is_locked = Set(is_locked);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新帖子失败: {e}")))?;

        self.get_post_by_id_impl(id).await
    }

    /// 删除帖子及其全部评论
    pub async fn delete_post_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        Comments::delete_many()
            .filter(CommentColumn::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除帖子评论失败: {e}")))?;

        let result = ForumPosts::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除帖子失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create_comment_impl(
        &self,
        post_id: i64,
        author_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment> {
        let now = chrono::Utc::now().timestamp();

        let model = CommentActiveModel {
            post_id: Set(post_id),
            author_id: Set(author_id),
            parent_comment_id: Set(req.parent_comment_id),
            content: Set(req.content),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建评论失败: {e}")))?;

        Ok(result.into_comment())
    }

    pub async fn get_comment_by_id_impl(&self, id: i64) -> Result<Option<Comment>> {
        let result = Comments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询评论失败: {e}")))?;

        Ok(result.map(|m| m.into_comment()))
    }

    /// 帖子下全部评论，按创建顺序
    pub async fn list_comments_impl(&self, post_id: i64) -> Result<Vec<Comment>> {
        let result = Comments::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .order_by_asc(CommentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询评论列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_comment()).collect())
    }

    pub async fn count_comments_impl(&self, post_id: i64) -> Result<u64> {
        Comments::find()
            .filter(CommentColumn::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计评论数量失败: {e}")))
    }

    pub async fn delete_comments_impl(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Comments::delete_many()
            .filter(CommentColumn::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除评论失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
