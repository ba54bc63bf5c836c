use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::forum::requests::{
    CreateCommentRequest, CreatePostRequest, PostListParams, UpdatePostRequest,
};
use crate::services::ForumService;

static FORUM_SERVICE: Lazy<ForumService> = Lazy::new(ForumService::new_lazy);

pub async fn list_posts(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PostListParams>,
) -> ActixResult<HttpResponse> {
    FORUM_SERVICE
        .list_posts(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn create_post(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreatePostRequest>,
) -> ActixResult<HttpResponse> {
    FORUM_SERVICE
        .create_post(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn get_post(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    FORUM_SERVICE.get_post(path.into_inner(), &req).await
}

pub async fn update_post(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> ActixResult<HttpResponse> {
    FORUM_SERVICE
        .update_post(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_post(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    FORUM_SERVICE.delete_post(path.into_inner(), &req).await
}

pub async fn create_comment(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateCommentRequest>,
) -> ActixResult<HttpResponse> {
    FORUM_SERVICE
        .create_comment(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_comment(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    FORUM_SERVICE.delete_comment(path.into_inner(), &req).await
}

// 配置路由
pub fn configure_forum_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/posts")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post)),
    );
    cfg.service(
        web::scope("/api/v1/posts")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_post))
                    .route(web::put().to(update_post))
                    .route(web::delete().to(delete_post)),
            )
            .route("/{id}/comments", web::post().to(create_comment)),
    );
    cfg.service(
        web::scope("/api/v1/comments")
            .wrap(middlewares::RequireJWT)
            .route("/{id}", web::delete().to(delete_comment)),
    );
}
