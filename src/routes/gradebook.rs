use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::gradebook::requests::CreateManualGradeRequest;
use crate::services::GradebookService;
use crate::services::gradebook::ManualGradeListParams;

static GRADEBOOK_SERVICE: Lazy<GradebookService> = Lazy::new(GradebookService::new_lazy);

pub async fn get_gradebook(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADEBOOK_SERVICE.get_gradebook(path.into_inner(), &req).await
}

pub async fn get_gradebook_stats(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    GRADEBOOK_SERVICE.get_stats(path.into_inner(), &req).await
}

pub async fn recalculate_course(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    GRADEBOOK_SERVICE
        .recalculate_course(path.into_inner(), &req)
        .await
}

pub async fn get_student_grade(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (course_id, student_id) = path.into_inner();
    GRADEBOOK_SERVICE
        .get_student_grade(course_id, student_id, &req)
        .await
}

pub async fn recalculate_student(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (course_id, student_id) = path.into_inner();
    GRADEBOOK_SERVICE
        .recalculate_student(course_id, student_id, &req)
        .await
}

pub async fn list_manual_grades(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ManualGradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADEBOOK_SERVICE
        .list_manual_grades(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn create_manual_grade(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateManualGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADEBOOK_SERVICE
        .create_manual_grade(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_manual_grade(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (course_id, entry_id) = path.into_inner();
    GRADEBOOK_SERVICE
        .delete_manual_grade(course_id, entry_id, &req)
        .await
}

// 学生查看自己的成绩
pub async fn get_my_grade(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADEBOOK_SERVICE.get_my_grade(path.into_inner(), &req).await
}

// 配置路由，须在 /api/v1/courses 之前注册
pub fn configure_gradebook_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/gradebook")
            .wrap(middlewares::RequireCourseRole::staff())
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(get_gradebook))
            .route("/stats", web::get().to(get_gradebook_stats))
            .route("/recalculate", web::post().to(recalculate_course))
            .route("/students/{student_id}", web::get().to(get_student_grade))
            .route(
                "/students/{student_id}/recalculate",
                web::post().to(recalculate_student),
            )
            .route("/manual", web::get().to(list_manual_grades))
            .route("/manual", web::post().to(create_manual_grade))
            .route("/manual/{entry_id}", web::delete().to(delete_manual_grade)),
    );
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/grades")
            .wrap(middlewares::RequireJWT)
            .route("/me", web::get().to(get_my_grade)),
    );
}
