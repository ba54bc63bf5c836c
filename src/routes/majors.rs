use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::majors::requests::{
    CreateCurriculumRequest, CreateMajorRequest, UpdateCurriculumRequest, UpdateMajorRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::MajorService;

static MAJOR_SERVICE: Lazy<MajorService> = Lazy::new(MajorService::new_lazy);

pub async fn list_majors(req: HttpRequest) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.list_majors(&req).await
}

pub async fn get_major(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.get_major(path.into_inner(), &req).await
}

pub async fn create_major(
    req: HttpRequest,
    body: web::Json<CreateMajorRequest>,
) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.create_major(body.into_inner(), &req).await
}

pub async fn update_major(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateMajorRequest>,
) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE
        .update_major(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_major(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.delete_major(path.into_inner(), &req).await
}

pub async fn list_curriculums(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.list_curriculums(path.into_inner(), &req).await
}

pub async fn create_curriculum(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateCurriculumRequest>,
) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE
        .create_curriculum(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn get_curriculum(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.get_curriculum(path.into_inner(), &req).await
}

pub async fn update_curriculum(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateCurriculumRequest>,
) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE
        .update_curriculum(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_curriculum(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    MAJOR_SERVICE.delete_curriculum(path.into_inner(), &req).await
}

// 配置路由
pub fn configure_major_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/majors")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 所有登录用户可查看专业列表
                    .route(web::get().to(list_majors))
                    .route(
                        web::post()
                            .to(create_major)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_major))
                    .route(
                        web::put()
                            .to(update_major)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_major)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/curriculums")
                    .route(web::get().to(list_curriculums))
                    .route(
                        web::post()
                            .to(create_curriculum)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/curriculums")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_curriculum))
                    .route(
                        web::put()
                            .to(update_curriculum)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_curriculum)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
