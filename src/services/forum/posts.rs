use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use tracing::info;

use super::thread::build_comment_tree;
use super::{ForumService, load_post};
use crate::models::{
    ApiResponse, ErrorCode,
    forum::{
        requests::{CreatePostRequest, PostListParams, PostListQuery, UpdatePostRequest},
        responses::{PostDetailResponse, PostListItem},
    },
};
use crate::services::permissions::{current_user, ensure_course_active, resolve_course_access};
use crate::services::{bad_request, forbidden, internal_error, load_user_summaries, not_found};
use crate::utils::validate::validate_required_text;

const MAX_TITLE_CHARS: usize = 200;
const MAX_CONTENT_CHARS: usize = 20_000;

pub async fn list_posts(
    service: &ForumService,
    course_id: i64,
    params: PostListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    if let Err(resp) = resolve_course_access(&storage, &user, course_id).await {
        return Ok(resp);
    }

    let (page, size) = params.pagination.normalized();
    let query = PostListQuery {
        page,
        size,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    let result = match storage.list_posts_with_pagination(course_id, query).await {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list posts", e)),
    };

    let author_ids: Vec<i64> = result.items.iter().map(|p| p.author_id).collect();
    let authors = match load_user_summaries(&storage, &author_ids).await {
        Ok(map) => map,
        Err(e) => return Ok(internal_error("Failed to list posts", e)),
    };

    let mut counts = HashMap::new();
    for post in &result.items {
        match storage.count_comments(post.id).await {
            Ok(count) => {
                counts.insert(post.id, count);
            }
            Err(e) => return Ok(internal_error("Failed to list posts", e)),
        }
    }

    let result = result.map(|post| PostListItem {
        author: authors.get(&post.author_id).cloned(),
        comment_count: counts.get(&post.id).copied().unwrap_or(0),
        post,
    });
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Success")))
}

pub async fn create_post(
    service: &ForumService,
    course_id: i64,
    mut post: CreatePostRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_required_text("title", &post.title, MAX_TITLE_CHARS) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) = validate_required_text("content", &post.content, MAX_CONTENT_CHARS) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    post.title = post.title.trim().to_string();

    let storage = service.get_storage(request)?;
    let (course, _) = match resolve_course_access(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }

    match storage.create_post(course_id, user.id, post).await {
        Ok(post) => {
            info!("User {} created post {} in course {}", user.id, post.id, course_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(post, "Post created")))
        }
        Err(e) => Ok(internal_error("Failed to create post", e)),
    }
}

pub async fn get_post(
    service: &ForumService,
    post_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (post, _, _) = match load_post(&storage, &user, post_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let comments = match storage.list_comments(post_id).await {
        Ok(comments) => comments,
        Err(e) => return Ok(internal_error("Failed to load comments", e)),
    };
    let mut author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
    author_ids.push(post.author_id);
    let authors = match load_user_summaries(&storage, &author_ids).await {
        Ok(map) => map,
        Err(e) => return Ok(internal_error("Failed to load comments", e)),
    };

    let response = PostDetailResponse {
        author: authors.get(&post.author_id).cloned(),
        comments: build_comment_tree(&comments, &authors),
        post,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Success")))
}

pub async fn update_post(
    service: &ForumService,
    post_id: i64,
    mut update: UpdatePostRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Some(title) = &update.title {
        if let Err(msg) = validate_required_text("title", title, MAX_TITLE_CHARS) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        update.title = Some(title.trim().to_string());
    }
    if let Some(content) = &update.content
        && let Err(msg) = validate_required_text("content", content, MAX_CONTENT_CHARS)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request)?;
    let (post, _, access) = match load_post(&storage, &user, post_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let is_staff = access.is_staff();
    if !is_staff && post.author_id != user.id {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "You can only edit your own posts",
        ));
    }
    // 置顶与锁定只由教学人员操作
    if !is_staff && (update.is_pinned.is_some() || update.is_locked.is_some()) {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can pin or lock posts",
        ));
    }

    match storage.update_post(post_id, update).await {
        Ok(Some(post)) => Ok(HttpResponse::Ok().json(ApiResponse::success(post, "Post updated"))),
        Ok(None) => Ok(not_found(ErrorCode::PostNotFound, "Post not found")),
        Err(e) => Ok(internal_error("Failed to update post", e)),
    }
}

pub async fn delete_post(
    service: &ForumService,
    post_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (post, _, access) = match load_post(&storage, &user, post_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() && post.author_id != user.id {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "You can only delete your own posts",
        ));
    }

    match storage.delete_post(post_id).await {
        Ok(true) => {
            info!("Post {} deleted by user {}", post_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Post deleted")))
        }
        Ok(false) => Ok(not_found(ErrorCode::PostNotFound, "Post not found")),
        Err(e) => Ok(internal_error("Failed to delete post", e)),
    }
}
