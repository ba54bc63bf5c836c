use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::SubmissionService;
use super::lifecycle::{check_admission, initial_status};
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::requests::{CreateSubmissionRequest, NewSubmission},
};
use crate::services::assignments::load_assignment;
use crate::services::permissions::{current_user, ensure_course_active};
use crate::services::{bad_request, forbidden, internal_error};
use crate::utils::validate::validate_required_text;

const MAX_CONTENT_CHARS: usize = 50_000;

pub async fn submit(
    service: &SubmissionService,
    assignment_id: i64,
    body: CreateSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_required_text("content", &body.content, MAX_CONTENT_CHARS) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request)?;
    let (assignment, course, access) = match load_assignment(&storage, &user, assignment_id).await
    {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_student() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only enrolled students can submit",
        ));
    }
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }

    let previous = match storage.get_max_attempt_number(assignment_id, user.id).await {
        Ok(n) => n,
        Err(e) => return Ok(internal_error("Failed to create submission", e)),
    };

    let now = Utc::now();
    let is_late = match check_admission(&assignment, previous, now) {
        Ok(late) => late,
        Err((code, msg)) => return Ok(bad_request(code, msg)),
    };

    let attempt_number = previous + 1;
    let submission = NewSubmission {
        assignment_id,
        student_id: user.id,
        attempt_number,
        content: body.content,
        status: initial_status(attempt_number),
        is_late,
        submitted_at: now,
    };

    match storage.create_submission(submission).await {
        Ok(submission) => {
            info!(
                "User {} submitted assignment {} (attempt {}, late: {})",
                user.id, assignment_id, attempt_number, is_late
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                submission,
                "Submission created",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create submission", e)),
    }
}
