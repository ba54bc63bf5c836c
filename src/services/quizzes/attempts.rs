use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::evaluate::{finalize_attempt, merge_answers};
use super::timing::{check_available, deadline_for};
use super::{
    QuizService, attempt_view, finalize_expired_in_list, finalize_if_expired, load_attempt,
    load_quiz,
};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::AttemptStatus,
        requests::{NewQuizAttempt, SaveAnswersRequest, SubmitAttemptRequest},
        responses::AttemptSummary,
    },
};
use crate::services::gradebook::refresh_student_grade;
use crate::services::permissions::{current_user, ensure_course_active};
use crate::services::{bad_request, conflict, forbidden, internal_error, load_user_summaries};

pub async fn start_attempt(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (quiz, course, access) = match load_quiz(&storage, &user, quiz_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_student() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only enrolled students can take quizzes",
        ));
    }
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }

    let now = Utc::now();

    // 继续未完成的作答；已超时的先自动交卷
    match storage.get_in_progress_attempt(quiz_id, user.id).await {
        Ok(Some(existing)) => match finalize_if_expired(&storage, &quiz, &course, existing, now).await {
            Ok(attempt) if attempt.is_in_progress() => {
                return Ok(HttpResponse::Ok().json(ApiResponse::success(
                    attempt_view(&quiz, attempt, false, now),
                    "Attempt resumed",
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(internal_error("Failed to start attempt", e)),
        },
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to start attempt", e)),
    }

    if let Err(msg) = check_available(&quiz, now) {
        return Ok(bad_request(ErrorCode::QuizNotAvailable, msg));
    }

    let previous = match storage.get_max_quiz_attempt_number(quiz_id, user.id).await {
        Ok(n) => n,
        Err(e) => return Ok(internal_error("Failed to start attempt", e)),
    };
    if let Some(max) = quiz.max_attempts
        && previous >= max
    {
        return Ok(conflict(
            ErrorCode::QuizAttemptsExceeded,
            format!("Maximum number of attempts ({max}) reached"),
        ));
    }

    let new_attempt = NewQuizAttempt {
        quiz_id,
        student_id: user.id,
        attempt_number: previous + 1,
        total_points: quiz.total_points(),
        questions_snapshot: quiz.questions.clone(),
        started_at: now,
        deadline_at: deadline_for(now, quiz.time_limit_minutes),
    };

    match storage.create_attempt(new_attempt).await {
        Ok(attempt) => {
            info!(
                "User {} started attempt {} of quiz {}",
                user.id, attempt.attempt_number, quiz_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                attempt_view(&quiz, attempt, false, now),
                "Attempt started",
            )))
        }
        Err(e) => Ok(internal_error("Failed to start attempt", e)),
    }
}

pub async fn list_attempts(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (quiz, course, access) = match load_quiz(&storage, &user, quiz_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let student_filter = (!access.is_staff()).then_some(user.id);
    let attempts = match storage.list_attempts(quiz_id, student_filter).await {
        Ok(attempts) => attempts,
        Err(e) => return Ok(internal_error("Failed to list attempts", e)),
    };
    let attempts = match finalize_expired_in_list(&storage, &quiz, &course, attempts, Utc::now()).await
    {
        Ok(attempts) => attempts,
        Err(e) => return Ok(internal_error("Failed to list attempts", e)),
    };

    let ids: Vec<i64> = attempts.iter().map(|a| a.student_id).collect();
    let students = match load_user_summaries(&storage, &ids).await {
        Ok(map) => map,
        Err(e) => return Ok(internal_error("Failed to list attempts", e)),
    };

    let items: Vec<AttemptSummary> = attempts
        .iter()
        .map(|a| AttemptSummary::new(a, students.get(&a.student_id).cloned()))
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "Success")))
}

pub async fn get_attempt(
    service: &QuizService,
    attempt_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (attempt, quiz, course, access) = match load_attempt(&storage, &user, attempt_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let now = Utc::now();
    match finalize_if_expired(&storage, &quiz, &course, attempt, now).await {
        Ok(attempt) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            attempt_view(&quiz, attempt, access.is_staff(), now),
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to load quiz attempt", e)),
    }
}

pub async fn save_answers(
    service: &QuizService,
    attempt_id: i64,
    body: SaveAnswersRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (attempt, quiz, course, _) = match load_attempt(&storage, &user, attempt_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if attempt.student_id != user.id {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "Only the student can answer this attempt",
        ));
    }
    if !attempt.is_in_progress() {
        return Ok(conflict(
            ErrorCode::QuizAttemptClosed,
            "This attempt has already been submitted",
        ));
    }

    let now = Utc::now();
    let mut attempt = match finalize_if_expired(&storage, &quiz, &course, attempt, now).await {
        Ok(attempt) if attempt.is_in_progress() => attempt,
        Ok(_) => {
            return Ok(conflict(
                ErrorCode::QuizTimeExpired,
                "Time limit exceeded, the attempt was submitted automatically",
            ));
        }
        Err(e) => return Ok(internal_error("Failed to save answers", e)),
    };

    attempt.answers = match merge_answers(&attempt.questions_snapshot, &attempt.answers, &body.answers)
    {
        Ok(answers) => answers,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };

    match storage.save_attempt(&attempt).await {
        Ok(saved) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            attempt_view(&quiz, saved, false, now),
            "Answers saved",
        ))),
        Err(e) => Ok(internal_error("Failed to save answers", e)),
    }
}

pub async fn submit_attempt(
    service: &QuizService,
    attempt_id: i64,
    body: SubmitAttemptRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (attempt, quiz, course, _) = match load_attempt(&storage, &user, attempt_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if attempt.student_id != user.id {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "Only the student can submit this attempt",
        ));
    }
    if !attempt.is_in_progress() {
        return Ok(conflict(
            ErrorCode::QuizAttemptClosed,
            "This attempt has already been submitted",
        ));
    }

    let now = Utc::now();
    let mut attempt = match finalize_if_expired(&storage, &quiz, &course, attempt, now).await {
        Ok(attempt) if attempt.is_in_progress() => attempt,
        Ok(_) => {
            return Ok(conflict(
                ErrorCode::QuizTimeExpired,
                "Time limit exceeded, the attempt was submitted automatically",
            ));
        }
        Err(e) => return Ok(internal_error("Failed to submit attempt", e)),
    };

    let incoming = body.answers.unwrap_or_default();
    attempt.answers = match merge_answers(&attempt.questions_snapshot, &attempt.answers, &incoming) {
        Ok(answers) => answers,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };
    finalize_attempt(&mut attempt, quiz.passing_score, false, now);

    let saved = match storage.save_attempt(&attempt).await {
        Ok(saved) => saved,
        Err(e) => return Ok(internal_error("Failed to submit attempt", e)),
    };
    info!(
        "User {} submitted attempt {} of quiz {} (status: {})",
        user.id, saved.id, quiz.id, saved.status
    );
    if saved.status == AttemptStatus::Graded {
        refresh_student_grade(&storage, &course, saved.student_id).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        attempt_view(&quiz, saved, false, now),
        "Attempt submitted",
    )))
}
