use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::submissions::requests::{
    CreateSubmissionRequest, GradeSubmissionRequest, ReturnSubmissionRequest, SubmissionListParams,
};
use crate::services::SubmissionService;

static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

pub async fn submit(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .submit(path.into_inner(), body.into_inner(), &req)
        .await
}

// 教学人员查看全部提交
pub async fn list_submissions(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn list_my_submissions(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_my_submissions(path.into_inner(), &req)
        .await
}

pub async fn get_submission(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_submission(path.into_inner(), &req).await
}

pub async fn grade_submission(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .grade_submission(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn return_submission(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReturnSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .return_submission(path.into_inner(), body.into_inner(), &req)
        .await
}

// 配置路由，须在 /api/v1/assignments 之前注册
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments/{assignment_id}/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(submit))
                    .route(web::get().to(list_submissions)),
            )
            .service(web::resource("/me").route(web::get().to(list_my_submissions))),
    );
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            .route("/{id}", web::get().to(get_submission))
            .route("/{id}/grade", web::put().to(grade_submission))
            .route("/{id}/return", web::put().to(return_submission)),
    );
}
