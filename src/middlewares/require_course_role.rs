//! 课程内角色校验
//!
//! 从路径参数 `course_id` 读取课程，要求当前用户在该课程中拥有指定角色之一。
//! 管理员始终放行。通过后把 [`CourseUser`] 放入请求扩展（管理员非成员时不放入）。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{error, info};

use crate::models::{
    ErrorCode,
    course_users::entities::{CourseRole, CourseUser},
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

use super::create_error_response;

#[derive(Clone)]
pub struct RequireCourseRole {
    allowed: Vec<CourseRole>,
}

impl RequireCourseRole {
    pub fn new_any(roles: &[CourseRole]) -> Self {
        Self {
            allowed: roles.to_vec(),
        }
    }

    /// 教师或助教
    pub fn staff() -> Self {
        Self::new_any(CourseRole::staff_roles())
    }

    /// 课程当前成员（已由中间件校验）
    pub fn extract_membership(req: &actix_web::HttpRequest) -> Option<CourseUser> {
        req.extensions().get::<CourseUser>().cloned()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireCourseRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireCourseRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireCourseRoleMiddleware {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireCourseRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Vec<CourseRole>,
}

impl<S, B> Service<ServiceRequest> for RequireCourseRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed = self.allowed.clone();

        Box::pin(async move {
            let identity = req.extensions().get::<User>().map(|u| (u.id, u.role));
            let Some((user_id, role)) = identity else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            let course_id = match req.match_info().get("course_id").map(str::parse::<i64>) {
                Some(Ok(id)) => id,
                _ => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::BAD_REQUEST,
                            ErrorCode::BadRequest,
                            "Invalid course id",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            let storage = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|s| s.get_ref().clone());
            let Some(storage) = storage else {
                error!("Storage is not registered in app data");
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Storage unavailable",
                    )
                    .map_into_right_body(),
                ));
            };

            let membership = match storage.get_course_user(course_id, user_id).await {
                Ok(m) => m,
                Err(e) => {
                    error!(
                        "Failed to load membership of user {} in course {}: {}",
                        user_id, course_id, e
                    );
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Failed to check course permission",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            let permitted = role == UserRole::Admin
                || membership
                    .as_ref()
                    .is_some_and(|m| allowed.contains(&m.role));

            if !permitted {
                info!(
                    "Course access denied for user {} in course {} (membership: {:?})",
                    user_id,
                    course_id,
                    membership.as_ref().map(|m| m.role)
                );
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        ErrorCode::CoursePermissionDenied,
                        "You do not have permission for this course",
                    )
                    .map_into_right_body(),
                ));
            }

            if let Some(membership) = membership {
                req.extensions_mut().insert(membership);
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}
