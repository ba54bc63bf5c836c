use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::evaluate::recompute_totals;
use super::{QuizService, attempt_view, finalize_if_expired, load_attempt};
use crate::models::{
    ApiResponse, ErrorCode,
    notifications::{
        entities::{NotificationType, ReferenceType},
        requests::NewNotification,
    },
    quizzes::{
        entities::{AttemptAnswer, AttemptStatus, QuizAttempt},
        requests::{GradeAnswerEntry, GradeAttemptRequest},
    },
};
use crate::services::gradebook::refresh_student_grade;
use crate::services::notifications::dispatch::notify_user;
use crate::services::permissions::current_user;
use crate::services::{bad_request, conflict, forbidden, internal_error};

/// 写入人工评分；题目不存在或分值越界时返回错误码与说明
pub fn apply_manual_grades(
    attempt: &mut QuizAttempt,
    grades: &[GradeAnswerEntry],
) -> Result<(), (ErrorCode, String)> {
    for entry in grades {
        let Some(question) = attempt
            .questions_snapshot
            .iter()
            .find(|q| q.id == entry.question_id)
        else {
            return Err((
                ErrorCode::BadRequest,
                format!("Unknown question id: {}", entry.question_id),
            ));
        };
        if !entry.points.is_finite() || entry.points < 0.0 || entry.points > question.points {
            return Err((
                ErrorCode::GradeOutOfRange,
                format!(
                    "Points for question {} must be between 0 and {}",
                    question.id, question.points
                ),
            ));
        }

        let is_correct = question
            .question_type
            .is_auto_gradable()
            .then_some(entry.points >= question.points);
        match attempt
            .answers
            .iter_mut()
            .find(|a| a.question_id == entry.question_id)
        {
            Some(answer) => {
                answer.points_awarded = Some(entry.points);
                answer.feedback = entry.feedback.clone();
                if is_correct.is_some() {
                    answer.is_correct = is_correct;
                }
            }
            None => attempt.answers.push(AttemptAnswer {
                question_id: entry.question_id.clone(),
                answer: None,
                is_correct,
                points_awarded: Some(entry.points),
                feedback: entry.feedback.clone(),
            }),
        }
    }
    Ok(())
}

pub async fn grade_attempt(
    service: &QuizService,
    attempt_id: i64,
    body: GradeAttemptRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if body.grades.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "grades must not be empty"));
    }

    let storage = service.get_storage(request)?;
    let (attempt, quiz, course, access) =
        match load_attempt(&storage, &user, attempt_id).await {
            Ok(v) => v,
            Err(resp) => return Ok(resp),
        };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can grade attempts",
        ));
    }

    let now = Utc::now();
    let mut attempt = match finalize_if_expired(&storage, &quiz, &course, attempt, now).await {
        Ok(attempt) => attempt,
        Err(e) => return Ok(internal_error("Failed to grade attempt", e)),
    };
    if attempt.is_in_progress() {
        return Ok(conflict(
            ErrorCode::QuizAttemptClosed,
            "The attempt has not been submitted yet",
        ));
    }

    if let Err((code, msg)) = apply_manual_grades(&mut attempt, &body.grades) {
        return Ok(bad_request(code, msg));
    }
    recompute_totals(&mut attempt, quiz.passing_score, now);

    let saved = match storage.save_attempt(&attempt).await {
        Ok(saved) => saved,
        Err(e) => return Ok(internal_error("Failed to grade attempt", e)),
    };
    info!(
        "Attempt {} graded by user {} (status: {})",
        saved.id, user.id, saved.status
    );

    if saved.status == AttemptStatus::Graded {
        notify_user(
            &storage,
            NewNotification {
                user_id: saved.student_id,
                notification_type: NotificationType::QuizGraded,
                title: format!("Your attempt on \"{}\" has been graded", quiz.title),
                content: None,
                reference_type: Some(ReferenceType::QuizAttempt),
                reference_id: Some(saved.id),
            },
        )
        .await;
        refresh_student_grade(&storage, &course, saved.student_id).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        attempt_view(&quiz, saved, true, now),
        "Attempt graded",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::entities::{Question, QuestionType};

    fn submitted_attempt() -> QuizAttempt {
        let essay = Question {
            id: "es".to_string(),
            question_type: QuestionType::Essay,
            text: "Discuss".to_string(),
            options: Vec::new(),
            correct_answer: None,
            accepted_answers: Vec::new(),
            case_sensitive: false,
            points: 10.0,
        };
        QuizAttempt {
            id: 3,
            quiz_id: 1,
            student_id: 4,
            attempt_number: 1,
            questions_snapshot: vec![essay],
            answers: vec![AttemptAnswer {
                question_id: "es".to_string(),
                answer: Some("text".to_string()),
                is_correct: None,
                points_awarded: None,
                feedback: None,
            }],
            status: AttemptStatus::Submitted,
            score: Some(0.0),
            total_points: 10.0,
            percentage: Some(0.0),
            passed: None,
            auto_submitted: false,
            started_at: Utc::now(),
            deadline_at: None,
            submitted_at: Some(Utc::now()),
            graded_at: None,
        }
    }

    fn entry(question_id: &str, points: f64) -> GradeAnswerEntry {
        GradeAnswerEntry {
            question_id: question_id.to_string(),
            points,
            feedback: Some("ok".to_string()),
        }
    }

    #[test]
    fn test_manual_grade_completes_attempt() {
        let mut attempt = submitted_attempt();
        apply_manual_grades(&mut attempt, &[entry("es", 7.5)]).unwrap();
        recompute_totals(&mut attempt, 70.0, Utc::now());

        assert_eq!(attempt.answers[0].points_awarded, Some(7.5));
        assert_eq!(attempt.answers[0].is_correct, None);
        assert_eq!(attempt.status, AttemptStatus::Graded);
        assert_eq!(attempt.percentage, Some(75.0));
        assert_eq!(attempt.passed, Some(true));
    }

    #[test]
    fn test_manual_grade_rejects_out_of_range() {
        let mut attempt = submitted_attempt();
        let err = apply_manual_grades(&mut attempt, &[entry("es", 11.0)]).unwrap_err();
        assert_eq!(err.0, ErrorCode::GradeOutOfRange);
        let err = apply_manual_grades(&mut attempt, &[entry("es", -1.0)]).unwrap_err();
        assert_eq!(err.0, ErrorCode::GradeOutOfRange);
        let err = apply_manual_grades(&mut attempt, &[entry("zz", 1.0)]).unwrap_err();
        assert_eq!(err.0, ErrorCode::BadRequest);
    }
}
