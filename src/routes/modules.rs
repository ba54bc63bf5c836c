use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::modules::requests::{CreateModuleRequest, UpdateModuleRequest};
use crate::services::ModuleService;

static MODULE_SERVICE: Lazy<ModuleService> = Lazy::new(ModuleService::new_lazy);

pub async fn list_modules(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MODULE_SERVICE.list_modules(path.into_inner(), &req).await
}

pub async fn create_module(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateModuleRequest>,
) -> ActixResult<HttpResponse> {
    MODULE_SERVICE
        .create_module(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn get_module(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MODULE_SERVICE.get_module(path.into_inner(), &req).await
}

pub async fn update_module(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateModuleRequest>,
) -> ActixResult<HttpResponse> {
    MODULE_SERVICE
        .update_module(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_module(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    MODULE_SERVICE.delete_module(path.into_inner(), &req).await
}

// 配置路由
pub fn configure_module_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/modules")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_modules))
                    .route(
                        web::post()
                            .to(create_module)
                            .wrap(middlewares::RequireCourseRole::staff()),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/modules")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_module))
                    .route(web::put().to(update_module))
                    .route(web::delete().to(delete_module)),
            ),
    );
}
