use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::quizzes::requests::{
    CreateQuizRequest, GradeAttemptRequest, QuizListParams, SaveAnswersRequest,
    SubmitAttemptRequest, UpdateQuizRequest,
};
use crate::services::QuizService;

// 懒加载的全局 QuizService 实例
static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

pub async fn list_quizzes(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<QuizListParams>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .list_quizzes(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn create_quiz(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .create_quiz(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn get_quiz(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz(path.into_inner(), &req).await
}

pub async fn update_quiz(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .update_quiz(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_quiz(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.delete_quiz(path.into_inner(), &req).await
}

pub async fn get_quiz_stats(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_stats(path.into_inner(), &req).await
}

// 开始作答，已有进行中的作答时直接返回
pub async fn start_attempt(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.start_attempt(path.into_inner(), &req).await
}

pub async fn list_attempts(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_attempts(path.into_inner(), &req).await
}

pub async fn get_attempt(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_attempt(path.into_inner(), &req).await
}

pub async fn save_answers(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SaveAnswersRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .save_answers(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn submit_attempt(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SubmitAttemptRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .submit_attempt(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn grade_attempt(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<GradeAttemptRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .grade_attempt(path.into_inner(), body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/quizzes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_quizzes))
                    .route(
                        web::post()
                            .to(create_quiz)
                            .wrap(middlewares::RequireCourseRole::staff()),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/quizzes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_quiz))
                    .route(web::put().to(update_quiz))
                    .route(web::delete().to(delete_quiz)),
            )
            .service(web::resource("/{id}/stats").route(web::get().to(get_quiz_stats)))
            .service(
                web::resource("/{id}/attempts")
                    .route(web::post().to(start_attempt))
                    .route(web::get().to(list_attempts)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/attempts")
            .wrap(middlewares::RequireJWT)
            .route("/{id}", web::get().to(get_attempt))
            .route("/{id}/answers", web::put().to(save_answers))
            .route("/{id}/submit", web::post().to(submit_attempt))
            .route("/{id}/grade", web::put().to(grade_attempt)),
    );
}
