use super::entities::{AttemptStatus, Quiz, QuizAttempt};
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizListItem {
    pub id: i64,
    pub course_id: i64,
    pub module_id: Option<i64>,
    pub title: String,
    pub question_count: usize,
    pub total_points: f64,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub passing_score: f64,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_published: bool,
    pub attempts_used: Option<i32>,
}

impl QuizListItem {
    pub fn from_quiz(quiz: &Quiz, attempts_used: Option<i32>) -> Self {
        Self {
            id: quiz.id,
            course_id: quiz.course_id,
            module_id: quiz.module_id,
            title: quiz.title.clone(),
            question_count: quiz.questions.len(),
            total_points: quiz.total_points(),
            time_limit_minutes: quiz.time_limit_minutes,
            max_attempts: quiz.max_attempts,
            passing_score: quiz.passing_score,
            available_from: quiz.available_from,
            due_date: quiz.due_date,
            is_published: quiz.is_published,
            attempts_used,
        }
    }
}

/// 作答视图；`answers_visible` 为 false 时题目中的答案已被去除
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct AttemptView {
    #[serde(flatten)]
    #[ts(flatten)]
    pub attempt: QuizAttempt,
    pub answers_visible: bool,
    /// 距截止还剩的秒数，仅进行中的限时作答有值
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct AttemptSummary {
    pub id: i64,
    pub quiz_id: i64,
    pub student: Option<UserSummary>,
    pub attempt_number: i32,
    pub status: AttemptStatus,
    pub score: Option<f64>,
    pub total_points: f64,
    pub percentage: Option<f64>,
    pub passed: Option<bool>,
    pub auto_submitted: bool,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AttemptSummary {
    pub fn new(attempt: &QuizAttempt, student: Option<UserSummary>) -> Self {
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            student,
            attempt_number: attempt.attempt_number,
            status: attempt.status,
            score: attempt.score,
            total_points: attempt.total_points,
            percentage: attempt.percentage,
            passed: attempt.passed,
            auto_submitted: attempt.auto_submitted,
            started_at: attempt.started_at,
            submitted_at: attempt.submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuestionStats {
    pub question_id: String,
    pub answered: u64,
    pub correct: u64,
    /// 可自动判分题目的正确率，问答题为空
    pub correct_rate: Option<f64>,
    pub average_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizStatsResponse {
    pub quiz_id: i64,
    pub total_attempts: u64,
    pub finished_attempts: u64,
    pub graded_attempts: u64,
    pub unique_students: u64,
    pub average_percentage: Option<f64>,
    pub pass_rate: Option<f64>,
    pub questions: Vec<QuestionStats>,
}
