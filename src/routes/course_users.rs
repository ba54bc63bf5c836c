use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::course_users::entities::CourseRole;
use crate::models::course_users::requests::{CourseUserListParams, UpdateCourseUserRequest};
use crate::models::courses::requests::EnrollRequest;
use crate::services::CourseUserService;

static COURSE_USER_SERVICE: Lazy<CourseUserService> = Lazy::new(CourseUserService::new_lazy);

pub async fn enroll(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<EnrollRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_USER_SERVICE
        .enroll(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn leave(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_USER_SERVICE.leave(path.into_inner(), &req).await
}

pub async fn list_members(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<CourseUserListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_USER_SERVICE
        .list_members(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn update_member(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<UpdateCourseUserRequest>,
) -> ActixResult<HttpResponse> {
    let (course_id, user_id) = path.into_inner();
    COURSE_USER_SERVICE
        .update_member_role(course_id, user_id, body.into_inner(), &req)
        .await
}

pub async fn remove_member(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (course_id, user_id) = path.into_inner();
    COURSE_USER_SERVICE
        .remove_member(course_id, user_id, &req)
        .await
}

// 配置路由，须在 /api/v1/courses 之前注册
pub fn configure_course_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/enroll")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 选课按用户限流，防止枚举密钥
                    .route(
                        web::post()
                            .to(enroll)
                            .wrap(middlewares::RateLimit::enrollment_key()),
                    )
                    .route(web::delete().to(leave)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/courses/{course_id}/members")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::get()
                        .to(list_members)
                        .wrap(middlewares::RequireCourseRole::new_any(
                            CourseRole::all_roles(),
                        )),
                ),
            )
            .service(
                web::resource("/{user_id}")
                    .wrap(middlewares::RequireCourseRole::staff())
                    .route(web::put().to(update_member))
                    .route(web::delete().to(remove_member)),
            ),
    );
}
