use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubmissionService;
use super::lifecycle::can_transition;
use super::list::load_submission;
use crate::models::{
    ApiResponse, ErrorCode,
    notifications::{
        entities::{NotificationType, ReferenceType},
        requests::NewNotification,
    },
    submissions::{
        entities::SubmissionStatus,
        requests::{GradeSubmissionRequest, ReturnSubmissionRequest},
    },
};
use crate::services::gradebook::refresh_student_grade;
use crate::services::notifications::dispatch::notify_user;
use crate::services::permissions::current_user;
use crate::services::{bad_request, conflict, forbidden, internal_error, not_found};

pub async fn grade_submission(
    service: &SubmissionService,
    submission_id: i64,
    body: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (submission, assignment, course, access) =
        match load_submission(&storage, &user, submission_id).await {
            Ok(v) => v,
            Err(resp) => return Ok(resp),
        };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can grade submissions",
        ));
    }

    if !body.grade.is_finite() || body.grade < 0.0 || body.grade > assignment.max_grade {
        return Ok(bad_request(
            ErrorCode::GradeOutOfRange,
            format!("Grade must be between 0 and {}", assignment.max_grade),
        ));
    }
    if !can_transition(submission.status, SubmissionStatus::Graded) {
        return Ok(conflict(
            ErrorCode::SubmissionStatusInvalid,
            format!("Cannot grade a submission in status {}", submission.status),
        ));
    }

    let graded = match storage
        .grade_submission(submission_id, body.grade, body.feedback, user.id)
        .await
    {
        Ok(Some(s)) => s,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            ));
        }
        Err(e) => return Ok(internal_error("Failed to grade submission", e)),
    };

    info!(
        "Submission {} graded {} by user {}",
        submission_id, body.grade, user.id
    );

    notify_user(
        &storage,
        NewNotification {
            user_id: graded.student_id,
            notification_type: NotificationType::SubmissionGraded,
            title: format!("Your submission for \"{}\" has been graded", assignment.title),
            content: graded.feedback.clone(),
            reference_type: Some(ReferenceType::Submission),
            reference_id: Some(graded.id),
        },
    )
    .await;
    refresh_student_grade(&storage, &course, graded.student_id).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(graded, "Submission graded")))
}

pub async fn return_submission(
    service: &SubmissionService,
    submission_id: i64,
    body: ReturnSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (submission, _, course, access) =
        match load_submission(&storage, &user, submission_id).await {
            Ok(v) => v,
            Err(resp) => return Ok(resp),
        };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can return submissions",
        ));
    }
    if !can_transition(submission.status, SubmissionStatus::Returned) {
        return Ok(conflict(
            ErrorCode::SubmissionStatusInvalid,
            format!("Cannot return a submission in status {}", submission.status),
        ));
    }

    let was_graded = submission.status == SubmissionStatus::Graded;
    match storage
        .update_submission_status(submission_id, SubmissionStatus::Returned, body.feedback)
        .await
    {
        Ok(Some(returned)) => {
            info!("Submission {} returned by user {}", submission_id, user.id);
            // 退回已评分提交会改变学生成绩
            if was_graded {
                refresh_student_grade(&storage, &course, returned.student_id).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(returned, "Submission returned")))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        )),
        Err(e) => Ok(internal_error("Failed to return submission", e)),
    }
}
