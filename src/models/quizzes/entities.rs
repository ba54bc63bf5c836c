use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;
use crate::models::courses::entities::GradeCategory;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "quiz.ts")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

define_string_enum!(QuestionType, "题目类型" {
    MultipleChoice => MULTIPLE_CHOICE = "multiple_choice",
    TrueFalse => TRUE_FALSE = "true_false",
    ShortAnswer => SHORT_ANSWER = "short_answer",
    Essay => ESSAY = "essay",
});

impl QuestionType {
    /// 是否可自动判分
    pub fn is_auto_gradable(&self) -> bool {
        !matches!(self, QuestionType::Essay)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "quiz.ts")]
pub enum ShowAnswersAfter {
    Immediately,
    AfterDueDate,
    Never,
}

define_string_enum!(ShowAnswersAfter, "答案公布时机" {
    Immediately => IMMEDIATELY = "immediately",
    AfterDueDate => AFTER_DUE_DATE = "after_due_date",
    Never => NEVER = "never",
});

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "quiz.ts")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Graded,
}

define_string_enum!(AttemptStatus, "作答状态" {
    InProgress => IN_PROGRESS = "in_progress",
    Submitted => SUBMITTED = "submitted",
    Graded => GRADED = "graded",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct Question {
    /// 测验内唯一
    pub id: String,
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_answers: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    pub points: f64,
}

impl Question {
    /// 去掉答案信息，供学生作答时查看
    pub fn redacted(&self) -> Self {
        Self {
            correct_answer: None,
            accepted_answers: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct Quiz {
    pub id: i64,
    pub course_id: i64,
    pub module_id: Option<i64>,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub time_limit_minutes: Option<i32>,
    /// 为空表示不限次数
    pub max_attempts: Option<i32>,
    pub passing_score: f64,
    pub show_answers_after: ShowAnswersAfter,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_published: bool,
    pub category: GradeCategory,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Quiz {
    pub fn total_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn redacted(mut self) -> Self {
        self.questions = self.questions.iter().map(Question::redacted).collect();
        self
    }
}

/// 单题作答记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct AttemptAnswer {
    pub question_id: String,
    pub answer: Option<String>,
    pub is_correct: Option<bool>,
    /// 问答题在人工评分前为空
    pub points_awarded: Option<f64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub questions_snapshot: Vec<Question>,
    pub answers: Vec<AttemptAnswer>,
    pub status: AttemptStatus,
    pub score: Option<f64>,
    pub total_points: f64,
    pub percentage: Option<f64>,
    pub passed: Option<bool>,
    /// 超时后由服务端自动交卷
    pub auto_submitted: bool,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub deadline_at: Option<chrono::DateTime<chrono::Utc>>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl QuizAttempt {
    pub fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_question_omits_keys() {
        let q = Question {
            id: "q1".into(),
            question_type: QuestionType::ShortAnswer,
            text: "Capital of France?".into(),
            options: vec![],
            correct_answer: None,
            accepted_answers: vec!["Paris".into()],
            case_sensitive: false,
            points: 2.0,
        };
        let json = serde_json::to_value(q.redacted()).unwrap();
        assert!(json.get("accepted_answers").is_none());
        assert!(json.get("correct_answer").is_none());
        assert_eq!(json["question_type"], "short_answer");
    }
}
