use super::SeaOrmStorage;
use crate::entity::curriculums::{
    ActiveModel as CurriculumActiveModel, Column as CurriculumColumn, Entity as Curriculums,
};
use crate::entity::majors::{ActiveModel, Column, Entity as Majors};
use crate::errors::{LmsError, Result};
use crate::models::majors::{
    entities::{Curriculum, Major},
    requests::{
        CreateCurriculumRequest, CreateMajorRequest, UpdateCurriculumRequest, UpdateMajorRequest,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_major_impl(&self, req: CreateMajorRequest) -> Result<Major> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            code: Set(req.code),
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建专业失败: {e}")))?;

        Ok(result.into_major())
    }

    pub async fn get_major_by_id_impl(&self, id: i64) -> Result<Option<Major>> {
        let result = Majors::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询专业失败: {e}")))?;

        Ok(result.map(|m| m.into_major()))
    }

    pub async fn list_majors_impl(&self) -> Result<Vec<Major>> {
        let result = Majors::find()
            .order_by_asc(Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询专业列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_major()).collect())
    }

    pub async fn update_major_impl(
        &self,
        id: i64,
        update: UpdateMajorRequest,
    ) -> Result<Option<Major>> {
        if self.get_major_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(code) = update.code {
            model.code = Set(code);
        }

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新专业失败: {e}")))?;

        self.get_major_by_id_impl(id).await
    }

    /// 删除专业；培养方案级联删除，用户与课程的 major_id 置空
    pub async fn delete_major_impl(&self, id: i64) -> Result<bool> {
        let result = Majors::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除专业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create_curriculum_impl(
        &self,
        major_id: i64,
        req: CreateCurriculumRequest,
    ) -> Result<Curriculum> {
        let now = chrono::Utc::now().timestamp();
        let course_ids = serde_json::to_string(&req.course_ids)?;

        let model = CurriculumActiveModel {
            major_id: Set(major_id),
            name: Set(req.name),
            year: Set(req.year),
            description: Set(req.description),
            course_ids: Set(course_ids),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建培养方案失败: {e}")))?;

        Ok(result.into_curriculum())
    }

    pub async fn get_curriculum_by_id_impl(&self, id: i64) -> Result<Option<Curriculum>> {
        let result = Curriculums::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询培养方案失败: {e}")))?;

        Ok(result.map(|m| m.into_curriculum()))
    }

    pub async fn list_curriculums_by_major_impl(&self, major_id: i64) -> Result<Vec<Curriculum>> {
        let result = Curriculums::find()
            .filter(CurriculumColumn::MajorId.eq(major_id))
            .order_by_desc(CurriculumColumn::Year)
            .order_by_asc(CurriculumColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询培养方案列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_curriculum()).collect())
    }

    pub async fn update_curriculum_impl(
        &self,
        id: i64,
        update: UpdateCurriculumRequest,
    ) -> Result<Option<Curriculum>> {
        if self.get_curriculum_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = CurriculumActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(year) = update.year {
            model.year = Set(Some(year));
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(course_ids) = update.course_ids {
            model.course_ids = Set(serde_json::to_string(&course_ids)?);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新培养方案失败: {e}")))?;

        self.get_curriculum_by_id_impl(id).await
    }

    pub async fn delete_curriculum_impl(&self, id: i64) -> Result<bool> {
        let result = Curriculums::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除培养方案失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
