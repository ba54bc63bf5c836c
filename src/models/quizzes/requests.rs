use std::collections::HashMap;

use super::entities::{Question, ShowAnswersAfter};
use crate::models::common::pagination::PaginationQuery;
use crate::models::courses::entities::GradeCategory;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub module_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct QuizListQuery {
    pub page: u64,
    pub size: u64,
    pub module_id: Option<i64>,
    pub published_only: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct CreateQuizRequest {
    pub module_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    #[serde(default = "default_show_answers_after")]
    pub show_answers_after: ShowAnswersAfter,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub is_published: bool,
    pub category: Option<GradeCategory>,
}

fn default_passing_score() -> f64 {
    60.0
}

fn default_show_answers_after() -> ShowAnswersAfter {
    ShowAnswersAfter::Immediately
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct UpdateQuizRequest {
    pub module_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<Question>>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub passing_score: Option<f64>,
    pub show_answers_after: Option<ShowAnswersAfter>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_published: Option<bool>,
    pub category: Option<GradeCategory>,
    #[serde(default)]
    pub clear_time_limit: bool,
    #[serde(default)]
    pub clear_max_attempts: bool,
}

/// 作答内容，键为题目 id；值可以是字符串、布尔或数字
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct SaveAnswersRequest {
    #[ts(type = "Record<string, string | boolean | number | null>")]
    pub answers: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct SubmitAttemptRequest {
    #[ts(type = "Record<string, string | boolean | number | null> | null")]
    pub answers: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct GradeAnswerEntry {
    pub question_id: String,
    pub points: f64,
    pub feedback: Option<String>,
}

/// 人工评分（问答题）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct GradeAttemptRequest {
    pub grades: Vec<GradeAnswerEntry>,
}

/// 存储层新建作答
#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub questions_snapshot: Vec<Question>,
    pub total_points: f64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub deadline_at: Option<chrono::DateTime<chrono::Utc>>,
}
