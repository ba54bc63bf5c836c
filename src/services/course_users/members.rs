use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseUserService;
use crate::models::{
    ApiResponse, ErrorCode, PaginatedResponse,
    course_users::{
        entities::CourseRole,
        requests::{CourseUserListParams, CourseUserListQuery, UpdateCourseUserRequest},
        responses::CourseMember,
    },
    courses::entities::Course,
};
use crate::services::permissions::{
    CourseAccess, current_user, require_course_staff, resolve_course_access,
};
use crate::services::{bad_request, forbidden, internal_error, load_user_summaries, not_found};

/// 成员管理的通用限制：授课教师不可变更，助教不能授予或修改教师身份
fn check_member_change(
    course: &Course,
    access: &CourseAccess,
    target_user_id: i64,
    current_role: CourseRole,
    new_role: Option<CourseRole>,
) -> Result<(), HttpResponse> {
    if target_user_id == course.instructor_id {
        return Err(bad_request(
            ErrorCode::InstructorCannotLeave,
            "The instructor's membership cannot be changed",
        ));
    }
    let is_assistant = access.course_role() == Some(CourseRole::Assistant);
    if is_assistant
        && (current_role == CourseRole::Teacher || new_role == Some(CourseRole::Teacher))
    {
        return Err(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Assistants cannot manage teachers",
        ));
    }
    Ok(())
}

pub async fn list_members(
    service: &CourseUserService,
    course_id: i64,
    params: CourseUserListParams,
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
    let query = CourseUserListQuery {
        page,
        size,
        role: params.role,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };

    let result = match storage
        .list_course_users_with_pagination(course_id, query)
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list course members", e)),
    };

    let ids: Vec<i64> = result.items.iter().map(|m| m.user_id).collect();
    let users = match load_user_summaries(&storage, &ids).await {
        Ok(users) => users,
        Err(e) => return Ok(internal_error("Failed to list course members", e)),
    };

    // 用户已被删除的成员记录不返回
    let members: Vec<CourseMember> = result
        .items
        .iter()
        .filter_map(|m| {
            users.get(&m.user_id).map(|u| CourseMember {
                user: u.clone(),
                role: m.role,
                joined_at: m.joined_at,
            })
        })
        .collect();

    let response = PaginatedResponse {
        items: members,
        pagination: result.pagination,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Success")))
}

pub async fn update_member_role(
    service: &CourseUserService,
    course_id: i64,
    user_id: i64,
    update: UpdateCourseUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, access) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let membership = match storage.get_course_user(course_id, user_id).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::CourseUserNotFound,
                "Course member not found",
            ));
        }
        Err(e) => return Ok(internal_error("Failed to load course member", e)),
    };
    if let Err(resp) =
        check_member_change(&course, &access, user_id, membership.role, Some(update.role))
    {
        return Ok(resp);
    }

    match storage
        .update_course_user_role(course_id, user_id, update.role)
        .await
    {
        Ok(Some(updated)) => {
            info!(
                "User {} changed role of user {} in course {} to {}",
                user.id, user_id, course_id, updated.role
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Member role updated")))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::CourseUserNotFound,
            "Course member not found",
        )),
        Err(e) => Ok(internal_error("Failed to update course member", e)),
    }
}

pub async fn remove_member(
    service: &CourseUserService,
    course_id: i64,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, access) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let membership = match storage.get_course_user(course_id, user_id).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::CourseUserNotFound,
                "Course member not found",
            ));
        }
        Err(e) => return Ok(internal_error("Failed to load course member", e)),
    };
    if let Err(resp) = check_member_change(&course, &access, user_id, membership.role, None) {
        return Ok(resp);
    }

    match storage.remove_course_user(course_id, user_id).await {
        Ok(true) => {
            info!("User {} removed user {} from course {}", user.id, user_id, course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Member removed")))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::CourseUserNotFound,
            "Course member not found",
        )),
        Err(e) => Ok(internal_error("Failed to remove course member", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course_users::entities::CourseUser;
    use crate::models::courses::entities::{CourseStatus, GradingScheme};
    use chrono::Utc;

    fn course() -> Course {
        Course {
            id: 1,
            code: "CS101".to_string(),
            name: "Intro".to_string(),
            description: None,
            credits: 3,
            instructor_id: 10,
            major_id: None,
            enrollment_key: Some("ABCDEFGH".to_string()),
            status: CourseStatus::Active,
            grading_scheme: GradingScheme::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn member(user_id: i64, role: CourseRole) -> CourseUser {
        CourseUser {
            id: user_id,
            course_id: 1,
            user_id,
            role,
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_instructor_is_protected() {
        let access = CourseAccess::Admin;
        assert!(check_member_change(&course(), &access, 10, CourseRole::Teacher, None).is_err());
    }

    #[test]
    fn test_assistant_cannot_promote_to_teacher() {
        let access = CourseAccess::Staff(member(20, CourseRole::Assistant));
        let result = check_member_change(
            &course(),
            &access,
            30,
            CourseRole::Student,
            Some(CourseRole::Teacher),
        );
        assert!(result.is_err());
        assert!(
            check_member_change(
                &course(),
                &access,
                30,
                CourseRole::Student,
                Some(CourseRole::Assistant)
            )
            .is_ok()
        );
    }

    #[test]
    fn test_teacher_can_manage_co_teacher() {
        let access = CourseAccess::Staff(member(11, CourseRole::Teacher));
        assert!(check_member_change(&course(), &access, 12, CourseRole::Teacher, None).is_ok());
    }
}
