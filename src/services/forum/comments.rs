use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::thread::descendants_of;
use super::{ForumService, load_post};
use crate::models::{ApiResponse, ErrorCode, forum::requests::CreateCommentRequest};
use crate::services::permissions::{current_user, ensure_course_active};
use crate::services::{bad_request, forbidden, internal_error, not_found};
use crate::utils::validate::validate_required_text;

pub async fn create_comment(
    service: &ForumService,
    post_id: i64,
    comment: CreateCommentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_required_text("content", &comment.content, 5_000) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request)?;
    let (post, course, _) = match load_post(&storage, &user, post_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }
    if post.is_locked {
        return Ok(forbidden(ErrorCode::PostLocked, "This post is locked"));
    }

    if let Some(parent_id) = comment.parent_comment_id {
        match storage.get_comment_by_id(parent_id).await {
            Ok(Some(parent)) if parent.post_id == post_id => {}
            Ok(_) => {
                return Ok(bad_request(
                    ErrorCode::CommentNotFound,
                    "Parent comment does not belong to this post",
                ));
            }
            Err(e) => return Ok(internal_error("Failed to load parent comment", e)),
        }
    }

    match storage.create_comment(post_id, user.id, comment).await {
        Ok(comment) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(comment, "Comment created")))
        }
        Err(e) => Ok(internal_error("Failed to create comment", e)),
    }
}

pub async fn delete_comment(
    service: &ForumService,
    comment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let comment = match storage.get_comment_by_id(comment_id).await {
        Ok(Some(comment)) => comment,
        Ok(None) => return Ok(not_found(ErrorCode::CommentNotFound, "Comment not found")),
        Err(e) => return Ok(internal_error("Failed to load comment", e)),
    };
    let (_, _, access) = match load_post(&storage, &user, comment.post_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() && comment.author_id != user.id {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "You can only delete your own comments",
        ));
    }

    // 回复随父评论一起删除
    let siblings = match storage.list_comments(comment.post_id).await {
        Ok(comments) => comments,
        Err(e) => return Ok(internal_error("Failed to delete comment", e)),
    };
    let ids = descendants_of(&siblings, comment_id);

    match storage.delete_comments(&ids).await {
        Ok(deleted) => {
            info!(
                "Comment {} and {} replies deleted by user {}",
                comment_id,
                deleted.saturating_sub(1),
                user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Comment deleted")))
        }
        Err(e) => Ok(internal_error("Failed to delete comment", e)),
    }
}
