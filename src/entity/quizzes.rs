//! 测验实体

use sea_orm::entity::prelude::*;

use super::{from_json_column, to_datetime, to_datetime_opt};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub module_id: Option<i64>,
    pub created_by: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON 序列化的题目列表
    #[sea_orm(column_type = "Text")]
    pub questions: String,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    #[sea_orm(column_type = "Double")]
    pub passing_score: f64,
    pub show_answers_after: String,
    pub available_from: Option<i64>,
    pub due_date: Option<i64>,
    pub is_published: bool,
    pub category: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_quiz(self) -> crate::models::quizzes::entities::Quiz {
        use crate::models::courses::entities::GradeCategory;
        use crate::models::quizzes::entities::{Quiz, ShowAnswersAfter};

        Quiz {
            id: self.id,
            course_id: self.course_id,
            module_id: self.module_id,
            created_by: self.created_by,
            title: self.title,
            description: self.description,
            questions: from_json_column("quizzes", self.id, &self.questions),
            time_limit_minutes: self.time_limit_minutes,
            max_attempts: self.max_attempts,
            passing_score: self.passing_score,
            show_answers_after: self
                .show_answers_after
                .parse::<ShowAnswersAfter>()
                .unwrap_or(ShowAnswersAfter::Never),
            available_from: to_datetime_opt(self.available_from),
            due_date: to_datetime_opt(self.due_date),
            is_published: self.is_published,
            category: self
                .category
                .parse::<GradeCategory>()
                .unwrap_or(GradeCategory::Quizzes),
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
