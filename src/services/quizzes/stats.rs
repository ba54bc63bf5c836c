use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::collections::HashSet;

use super::{QuizService, finalize_expired_in_list, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::{AttemptStatus, Question, Quiz, QuizAttempt},
        responses::{QuestionStats, QuizStatsResponse},
    },
};
use crate::services::permissions::current_user;
use crate::services::{forbidden, internal_error, round2};

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// 判分相关字段一致；题干措辞的修改不影响统计
fn grades_alike(live: &Question, snapshot: &Question) -> bool {
    live.question_type == snapshot.question_type
        && live.correct_answer == snapshot.correct_answer
        && live.accepted_answers == snapshot.accepted_answers
        && live.case_sensitive == snapshot.case_sensitive
        && live.options == snapshot.options
        && live.points == snapshot.points
}

/// 测验统计；平均分与通过率只计已评分作答。
/// 逐题统计只计快照中该题与当前题目判分方式一致的已交卷作答，题目修改前的作答不混入。
pub fn compute_quiz_stats(quiz: &Quiz, attempts: &[QuizAttempt]) -> QuizStatsResponse {
    let finished: Vec<&QuizAttempt> = attempts.iter().filter(|a| !a.is_in_progress()).collect();
    let graded: Vec<&QuizAttempt> = finished
        .iter()
        .copied()
        .filter(|a| a.status == AttemptStatus::Graded)
        .collect();

    let percentages: Vec<f64> = graded.iter().filter_map(|a| a.percentage).collect();
    let pass_rate = if graded.is_empty() {
        None
    } else {
        let passed = graded.iter().filter(|a| a.passed == Some(true)).count();
        Some(round2(passed as f64 / graded.len() as f64 * 100.0))
    };

    let questions = quiz
        .questions
        .iter()
        .map(|question| {
            let answers: Vec<_> = finished
                .iter()
                .filter(|a| {
                    a.questions_snapshot
                        .iter()
                        .find(|q| q.id == question.id)
                        .is_some_and(|q| grades_alike(question, q))
                })
                .filter_map(|a| a.answers.iter().find(|ans| ans.question_id == question.id))
                .filter(|ans| ans.answer.is_some())
                .collect();
            let answered = answers.len() as u64;
            let correct = answers
                .iter()
                .filter(|ans| ans.is_correct == Some(true))
                .count() as u64;
            let points: Vec<f64> = answers.iter().filter_map(|ans| ans.points_awarded).collect();

            QuestionStats {
                question_id: question.id.clone(),
                answered,
                correct,
                correct_rate: (question.question_type.is_auto_gradable() && answered > 0)
                    .then(|| round2(correct as f64 / answered as f64 * 100.0)),
                average_points: mean(&points),
            }
        })
        .collect();

    QuizStatsResponse {
        quiz_id: quiz.id,
        total_attempts: attempts.len() as u64,
        finished_attempts: finished.len() as u64,
        graded_attempts: graded.len() as u64,
        unique_students: attempts
            .iter()
            .map(|a| a.student_id)
            .collect::<HashSet<_>>()
            .len() as u64,
        average_percentage: mean(&percentages),
        pass_rate,
        questions,
    }
}

pub async fn get_quiz_stats(
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
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can view statistics",
        ));
    }

    let attempts = match storage.list_attempts(quiz_id, None).await {
        Ok(attempts) => attempts,
        Err(e) => return Ok(internal_error("Failed to load quiz statistics", e)),
    };
    match finalize_expired_in_list(&storage, &quiz, &course, attempts, Utc::now()).await {
        Ok(attempts) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            compute_quiz_stats(&quiz, &attempts),
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to load quiz statistics", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradeCategory;
    use crate::models::quizzes::entities::{
        AttemptAnswer, Question, QuestionType, ShowAnswersAfter,
    };
    use chrono::Utc;

    fn quiz() -> Quiz {
        let now = Utc::now();
        let q = |id: &str, question_type| Question {
            id: id.to_string(),
            question_type,
            text: id.to_string(),
            options: vec!["a".into(), "b".into()],
            correct_answer: Some("a".into()),
            accepted_answers: Vec::new(),
            case_sensitive: false,
            points: 5.0,
        };
        Quiz {
            id: 9,
            course_id: 1,
            module_id: None,
            created_by: 1,
            title: "Stats".to_string(),
            description: None,
            questions: vec![q("q1", QuestionType::MultipleChoice), q("q2", QuestionType::Essay)],
            time_limit_minutes: None,
            max_attempts: None,
            passing_score: 50.0,
            show_answers_after: ShowAnswersAfter::Immediately,
            available_from: None,
            due_date: None,
            is_published: true,
            category: GradeCategory::Quizzes,
            created_at: now,
            updated_at: now,
        }
    }

    fn answer(question_id: &str, correct: Option<bool>, points: Option<f64>) -> AttemptAnswer {
        AttemptAnswer {
            question_id: question_id.to_string(),
            answer: Some("x".to_string()),
            is_correct: correct,
            points_awarded: points,
            feedback: None,
        }
    }

    fn attempt(
        student_id: i64,
        status: AttemptStatus,
        percentage: Option<f64>,
        answers: Vec<AttemptAnswer>,
    ) -> QuizAttempt {
        QuizAttempt {
            id: student_id,
            quiz_id: 9,
            student_id,
            attempt_number: 1,
            questions_snapshot: quiz().questions,
            answers,
            status,
            score: None,
            total_points: 10.0,
            percentage,
            passed: percentage.map(|p| p >= 50.0),
            auto_submitted: false,
            started_at: Utc::now(),
            deadline_at: None,
            submitted_at: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_quiz_stats() {
        let attempts = vec![
            attempt(
                1,
                AttemptStatus::Graded,
                Some(100.0),
                vec![answer("q1", Some(true), Some(5.0)), answer("q2", None, Some(5.0))],
            ),
            attempt(
                2,
                AttemptStatus::Graded,
                Some(30.0),
                vec![answer("q1", Some(false), Some(0.0)), answer("q2", None, Some(3.0))],
            ),
            attempt(
                3,
                AttemptStatus::Submitted,
                None,
                vec![answer("q1", Some(true), Some(5.0)), answer("q2", None, None)],
            ),
            attempt(3, AttemptStatus::InProgress, None, Vec::new()),
        ];

        let stats = compute_quiz_stats(&quiz(), &attempts);
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.finished_attempts, 3);
        assert_eq!(stats.graded_attempts, 2);
        assert_eq!(stats.unique_students, 3);
        assert_eq!(stats.average_percentage, Some(65.0));
        assert_eq!(stats.pass_rate, Some(50.0));

        let q1 = &stats.questions[0];
        assert_eq!(q1.answered, 3);
        assert_eq!(q1.correct, 2);
        assert_eq!(q1.correct_rate, Some(66.67));

        let q2 = &stats.questions[1];
        assert_eq!(q2.correct_rate, None);
        assert_eq!(q2.average_points, Some(4.0));
    }

    #[test]
    fn test_question_stats_skip_attempts_on_older_version() {
        let mut live = quiz();
        live.questions[0].correct_answer = Some("b".into());

        // 修改答案前作答，按旧快照判为正确
        let before = attempt(
            1,
            AttemptStatus::Graded,
            Some(100.0),
            vec![answer("q1", Some(true), Some(5.0)), answer("q2", None, Some(5.0))],
        );
        let mut after = attempt(
            2,
            AttemptStatus::Graded,
            Some(50.0),
            vec![answer("q1", Some(false), Some(0.0)), answer("q2", None, Some(5.0))],
        );
        after.questions_snapshot = live.questions.clone();

        let stats = compute_quiz_stats(&live, &[before, after]);
        let q1 = &stats.questions[0];
        assert_eq!(q1.answered, 1);
        assert_eq!(q1.correct, 0);
        assert_eq!(q1.correct_rate, Some(0.0));

        // 未修改的题目两次作答都计入
        assert_eq!(stats.questions[1].answered, 2);
        assert_eq!(stats.graded_attempts, 2);
    }

    #[test]
    fn test_quiz_stats_empty() {
        let stats = compute_quiz_stats(&quiz(), &[]);
        assert_eq!(stats.average_percentage, None);
        assert_eq!(stats.pass_rate, None);
        assert_eq!(stats.questions[0].correct_rate, None);
    }
}
