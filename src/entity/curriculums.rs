//! 培养方案实体

use sea_orm::entity::prelude::*;

use super::{from_json_column, to_datetime};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "curriculums")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub major_id: i64,
    pub name: String,
    pub year: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON 数组，保持顺序
    #[sea_orm(column_type = "Text")]
    pub course_ids: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::majors::Entity",
        from = "Column::MajorId",
        to = "super::majors::Column::Id"
    )]
    Major,
}

impl Related<super::majors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Major.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_curriculum(self) -> crate::models::majors::entities::Curriculum {
        crate::models::majors::entities::Curriculum {
            id: self.id,
            major_id: self.major_id,
            name: self.name,
            year: self.year,
            description: self.description,
            course_ids: from_json_column("curriculums", self.id, &self.course_ids),
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
