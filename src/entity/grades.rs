//! 成绩汇总实体（每个学生每门课程一条）

use sea_orm::entity::prelude::*;

use super::{from_json_column, to_datetime};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Text")]
    pub items: String,
    #[sea_orm(column_type = "Double")]
    pub total_earned: f64,
    #[sea_orm(column_type = "Double")]
    pub total_possible: f64,
    #[sea_orm(column_type = "Double", nullable)]
    pub current_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub status: String,
    pub calculated_at: i64,
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
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade(self) -> crate::models::gradebook::entities::Grade {
        use crate::models::gradebook::entities::{Grade, GradeStatus};

        Grade {
            id: self.id,
            course_id: self.course_id,
            student_id: self.student_id,
            items: from_json_column("grades", self.id, &self.items),
            total_earned: self.total_earned,
            total_possible: self.total_possible,
            current_grade: self.current_grade,
            letter_grade: self.letter_grade,
            status: self
                .status
                .parse::<GradeStatus>()
                .unwrap_or(GradeStatus::Incomplete),
            calculated_at: to_datetime(self.calculated_at),
        }
    }
}
