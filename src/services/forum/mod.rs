pub mod comments;
pub mod posts;
pub mod thread;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    courses::entities::Course,
    forum::{
        entities::ForumPost,
        requests::{CreateCommentRequest, CreatePostRequest, PostListParams, UpdatePostRequest},
    },
    users::entities::User,
};
use crate::services::permissions::{CourseAccess, resolve_course_access};
use crate::services::{internal_error, not_found};
use crate::storage::Storage;

pub struct ForumService {
    storage: Option<Arc<dyn Storage>>,
}

impl ForumService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_posts(
        &self,
        course_id: i64,
        params: PostListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        posts::list_posts(self, course_id, params, request).await
    }

    pub async fn create_post(
        &self,
        course_id: i64,
        post: CreatePostRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        posts::create_post(self, course_id, post, request).await
    }

    // 帖子详情附带评论树
    pub async fn get_post(&self, post_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        posts::get_post(self, post_id, request).await
    }

    pub async fn update_post(
        &self,
        post_id: i64,
        update: UpdatePostRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        posts::update_post(self, post_id, update, request).await
    }

    pub async fn delete_post(
        &self,
        post_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        posts::delete_post(self, post_id, request).await
    }

    pub async fn create_comment(
        &self,
        post_id: i64,
        comment: CreateCommentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        comments::create_comment(self, post_id, comment, request).await
    }

    pub async fn delete_comment(
        &self,
        comment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        comments::delete_comment(self, comment_id, request).await
    }
}

pub(crate) async fn load_post(
    storage: &Arc<dyn Storage>,
    user: &User,
    post_id: i64,
) -> Result<(ForumPost, Course, CourseAccess), HttpResponse> {
    let post = match storage.get_post_by_id(post_id).await {
        Ok(Some(post)) => post,
        Ok(None) => return Err(not_found(ErrorCode::PostNotFound, "Post not found")),
        Err(e) => return Err(internal_error("Failed to load post", e)),
    };
    let (course, access) = resolve_course_access(storage, user, post.course_id).await?;
    Ok((post, course, access))
}
