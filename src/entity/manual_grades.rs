//! 手动成绩条目实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "manual_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub title: String,
    pub category: String,
    #[sea_orm(column_type = "Double")]
    pub earned: f64,
    #[sea_orm(column_type = "Double")]
    pub possible: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
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
    pub fn into_manual_grade(self) -> crate::models::gradebook::entities::ManualGrade {
        use crate::models::courses::entities::GradeCategory;
        use crate::models::gradebook::entities::ManualGrade;

        ManualGrade {
            id: self.id,
            course_id: self.course_id,
            student_id: self.student_id,
            title: self.title,
            category: self
                .category
                .parse::<GradeCategory>()
                .unwrap_or(GradeCategory::Assignments),
            earned: self.earned,
            possible: self.possible,
            comment: self.comment,
            created_by: self.created_by,
            created_at: to_datetime(self.created_at),
        }
    }
}
