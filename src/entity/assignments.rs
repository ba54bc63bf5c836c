//! 作业实体

use sea_orm::entity::prelude::*;

use super::{to_datetime, to_datetime_opt};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub module_id: Option<i64>,
    pub created_by: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub max_grade: f64,
    pub due_date: Option<i64>,
    pub allow_late: bool,
    pub category: String,
    pub max_attempts: Option<i32>,
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
    #[sea_orm(
        belongs_to = "super::course_modules::Entity",
        from = "Column::ModuleId",
        to = "super::course_modules::Column::Id"
    )]
    Module,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::course_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assignment(self) -> crate::models::assignments::entities::Assignment {
        use crate::models::assignments::entities::Assignment;
        use crate::models::courses::entities::GradeCategory;

        Assignment {
            id: self.id,
            course_id: self.course_id,
            module_id: self.module_id,
            created_by: self.created_by,
            title: self.title,
            description: self.description,
            max_grade: self.max_grade,
            due_date: to_datetime_opt(self.due_date),
            allow_late: self.allow_late,
            category: self
                .category
                .parse::<GradeCategory>()
                .unwrap_or(GradeCategory::Assignments),
            max_attempts: self.max_attempts,
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
