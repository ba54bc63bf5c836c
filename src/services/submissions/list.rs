use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::SubmissionService;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::entities::Assignment,
    courses::entities::Course,
    submissions::{
        entities::Submission,
        requests::{SubmissionListParams, SubmissionListQuery},
        responses::SubmissionListItem,
    },
    users::entities::User,
};
use crate::services::assignments::load_assignment;
use crate::services::permissions::{CourseAccess, current_user};
use crate::services::{forbidden, internal_error, load_user_summaries, not_found};
use crate::storage::Storage;

/// 加载提交及其作业、课程与调用者身份
pub(crate) async fn load_submission(
    storage: &Arc<dyn Storage>,
    user: &User,
    submission_id: i64,
) -> Result<(Submission, Assignment, Course, CourseAccess), HttpResponse> {
    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            ));
        }
        Err(e) => return Err(internal_error("Failed to load submission", e)),
    };
    let (assignment, course, access) =
        load_assignment(storage, user, submission.assignment_id).await?;
    Ok((submission, assignment, course, access))
}

pub async fn list_my_submissions(
    service: &SubmissionService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    if let Err(resp) = load_assignment(&storage, &user, assignment_id).await {
        return Ok(resp);
    }

    match storage.list_student_submissions(assignment_id, user.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(items, "Success"))),
        Err(e) => Ok(internal_error("Failed to list submissions", e)),
    }
}

pub async fn list_submissions(
    service: &SubmissionService,
    assignment_id: i64,
    params: SubmissionListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (_, _, access) = match load_assignment(&storage, &user, assignment_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can view all submissions",
        ));
    }

    let (page, size) = params.pagination.normalized();
    let query = SubmissionListQuery {
        page,
        size,
        latest_only: !params.history,
        student_id: params.student_id,
    };

    let result = match storage
        .list_submissions_with_pagination(assignment_id, query)
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list submissions", e)),
    };

    let ids: Vec<i64> = result.items.iter().map(|s| s.student_id).collect();
    let students = match load_user_summaries(&storage, &ids).await {
        Ok(map) => map,
        Err(e) => return Ok(internal_error("Failed to list submissions", e)),
    };

    let result = result.map(|submission| SubmissionListItem {
        student: students.get(&submission.student_id).cloned(),
        submission,
    });
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Success")))
}

pub async fn get_submission(
    service: &SubmissionService,
    submission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (submission, _, _, access) = match load_submission(&storage, &user, submission_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    if !access.is_staff() && submission.student_id != user.id {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "You can only view your own submissions",
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(submission, "Success")))
}
