//! 课程级权限判定
//!
//! 嵌套在作业、测验、帖子等资源之下的接口无法从路径直接拿到 `course_id`，
//! 由服务层先加载资源，再通过这里解析调用者在所属课程中的身份。

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use super::{forbidden, internal_error, not_found};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    course_users::entities::{CourseRole, CourseUser},
    courses::entities::Course,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

/// 调用者在课程中的身份
#[derive(Debug, Clone)]
pub(crate) enum CourseAccess {
    /// 管理员，不论是否加入课程
    Admin,
    Staff(CourseUser),
    Student(CourseUser),
}

impl CourseAccess {
    pub fn is_staff(&self) -> bool {
        matches!(self, CourseAccess::Admin | CourseAccess::Staff(_))
    }

    pub fn is_student(&self) -> bool {
        matches!(self, CourseAccess::Student(_))
    }

    pub fn course_role(&self) -> Option<CourseRole> {
        match self {
            CourseAccess::Admin => None,
            CourseAccess::Staff(m) | CourseAccess::Student(m) => Some(m.role),
        }
    }
}

/// 当前登录用户；路由未挂 RequireJWT 时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))
    })
}

/// 判定身份，不涉及存储
pub(crate) fn classify_access(
    user_role: UserRole,
    membership: Option<CourseUser>,
) -> Option<CourseAccess> {
    if user_role == UserRole::Admin {
        return Some(CourseAccess::Admin);
    }
    match membership {
        Some(m) if m.role.is_staff() => Some(CourseAccess::Staff(m)),
        Some(m) => Some(CourseAccess::Student(m)),
        None => None,
    }
}

/// 加载课程并解析调用者身份；课程不存在返回 404，非成员返回 403
pub(crate) async fn resolve_course_access(
    storage: &Arc<dyn Storage>,
    user: &User,
    course_id: i64,
) -> Result<(Course, CourseAccess), HttpResponse> {
    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Err(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Err(internal_error("Failed to load course", e)),
    };

    let membership = if user.role == UserRole::Admin {
        None
    } else {
        match storage.get_course_user(course_id, user.id).await {
            Ok(m) => m,
            Err(e) => return Err(internal_error("Failed to load course membership", e)),
        }
    };

    match classify_access(user.role, membership) {
        Some(access) => Ok((course, access)),
        None => Err(forbidden(
            ErrorCode::CoursePermissionDenied,
            "You are not a member of this course",
        )),
    }
}

/// 要求课程教学人员（教师、助教或管理员）
pub(crate) async fn require_course_staff(
    storage: &Arc<dyn Storage>,
    user: &User,
    course_id: i64,
) -> Result<(Course, CourseAccess), HttpResponse> {
    let (course, access) = resolve_course_access(storage, user, course_id).await?;
    if !access.is_staff() {
        return Err(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ));
    }
    Ok((course, access))
}

/// 已归档课程拒绝写操作
pub(crate) fn ensure_course_active(course: &Course) -> Result<(), HttpResponse> {
    if course.is_archived() {
        return Err(super::bad_request(
            ErrorCode::CourseArchived,
            "Course is archived",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(role: CourseRole) -> CourseUser {
        let now = chrono::Utc::now();
        CourseUser {
            id: 1,
            course_id: 10,
            user_id: 7,
            role,
            joined_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_admin_always_has_access() {
        let access = classify_access(UserRole::Admin, None).unwrap();
        assert!(access.is_staff());
        assert_eq!(access.course_role(), None);
    }

    #[test]
    fn test_member_roles() {
        let assistant =
            classify_access(UserRole::Student, Some(membership(CourseRole::Assistant))).unwrap();
        assert!(assistant.is_staff());

        let student =
            classify_access(UserRole::Teacher, Some(membership(CourseRole::Student))).unwrap();
        assert!(student.is_student());
        assert_eq!(student.course_role(), Some(CourseRole::Student));
    }

    #[test]
    fn test_non_member_denied() {
        assert!(classify_access(UserRole::Teacher, None).is_none());
    }
}
