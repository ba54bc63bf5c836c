use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "notification.ts")]
pub enum NotificationType {
    SubmissionGraded,
    QuizGraded,
    AssignmentPublished,
    QuizPublished,
}

define_string_enum!(NotificationType, "通知类型" {
    SubmissionGraded => SUBMISSION_GRADED = "submission_graded",
    QuizGraded => QUIZ_GRADED = "quiz_graded",
    AssignmentPublished => ASSIGNMENT_PUBLISHED = "assignment_published",
    QuizPublished => QUIZ_PUBLISHED = "quiz_published",
});

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "notification.ts")]
pub enum ReferenceType {
    Assignment,
    Submission,
    Quiz,
    QuizAttempt,
}

define_string_enum!(ReferenceType, "关联类型" {
    Assignment => ASSIGNMENT = "assignment",
    Submission => SUBMISSION = "submission",
    Quiz => QUIZ = "quiz",
    QuizAttempt => QUIZ_ATTEMPT = "quiz_attempt",
});

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
