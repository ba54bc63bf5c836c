//! 测验作答实体

use sea_orm::entity::prelude::*;

use super::{from_json_column, to_datetime, to_datetime_opt};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    /// 开始作答时冻结的题目副本（JSON）
    #[sea_orm(column_type = "Text")]
    pub questions_snapshot: String,
    #[sea_orm(column_type = "Text")]
    pub answers: String,
    pub status: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub score: Option<f64>,
    #[sea_orm(column_type = "Double")]
    pub total_points: f64,
    #[sea_orm(column_type = "Double", nullable)]
    pub percentage: Option<f64>,
    pub passed: Option<bool>,
    pub auto_submitted: bool,
    pub started_at: i64,
    pub deadline_at: Option<i64>,
    pub submitted_at: Option<i64>,
    pub graded_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_attempt(self) -> crate::models::quizzes::entities::QuizAttempt {
        use crate::models::quizzes::entities::{AttemptStatus, QuizAttempt};

        QuizAttempt {
            id: self.id,
            quiz_id: self.quiz_id,
            student_id: self.student_id,
            attempt_number: self.attempt_number,
            questions_snapshot: from_json_column(
                "quiz_attempts",
                self.id,
                &self.questions_snapshot,
            ),
            answers: from_json_column("quiz_attempts", self.id, &self.answers),
            status: self
                .status
                .parse::<AttemptStatus>()
                .unwrap_or(AttemptStatus::Submitted),
            score: self.score,
            total_points: self.total_points,
            percentage: self.percentage,
            passed: self.passed,
            auto_submitted: self.auto_submitted,
            started_at: to_datetime(self.started_at),
            deadline_at: to_datetime_opt(self.deadline_at),
            submitted_at: to_datetime_opt(self.submitted_at),
            graded_at: to_datetime_opt(self.graded_at),
        }
    }
}
