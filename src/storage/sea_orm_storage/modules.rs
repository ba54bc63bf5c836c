use super::SeaOrmStorage;
use crate::entity::course_modules::{ActiveModel, Column, Entity as CourseModules};
use crate::errors::{LmsError, Result};
use crate::models::modules::{
    entities::CourseModule,
    requests::{CreateModuleRequest, UpdateModuleRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建课程单元；未指定位置时追加到末尾
    pub async fn create_module_impl(
        &self,
        course_id: i64,
        req: CreateModuleRequest,
    ) -> Result<CourseModule> {
        let now = chrono::Utc::now().timestamp();

        let position = match req.position {
            Some(position) => position,
            None => {
                let last = CourseModules::find()
                    .filter(Column::CourseId.eq(course_id))
                    .order_by_desc(Column::Position)
                    .one(&self.db)
                    .await
                    .map_err(|e| {
                        LmsError::database_operation(format!("查询单元位置失败: {e}"))
                    })?;
                last.map(|m| m.position + 1).unwrap_or(0)
            }
        };

        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(req.title),
            description: Set(req.description),
            position: Set(position),
            is_published: Set(req.is_published),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建课程单元失败: {e}")))?;

        Ok(result.into_module())
    }

    pub async fn get_module_by_id_impl(&self, id: i64) -> Result<Option<CourseModule>> {
        let result = CourseModules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程单元失败: {e}")))?;

        Ok(result.map(|m| m.into_module()))
    }

    pub async fn list_modules_impl(
        &self,
        course_id: i64,
        published_only: bool,
    ) -> Result<Vec<CourseModule>> {
        let mut select = CourseModules::find().filter(Column::CourseId.eq(course_id));

        if published_only {
            select = select.filter(Column::IsPublished.eq(true));
        }

        let result = select
            .order_by_asc(Column::Position)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程单元列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_module()).collect())
    }

    pub async fn update_module_impl(
        &self,
        id: i64,
        update: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>> {
        if self.get_module_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(position) = update.position {
            model.position = Set(position);
        }

        if let Some(is_published) = update.is_published {
            model.is_published = Set(is_published);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新课程单元失败: {e}")))?;

        self.get_module_by_id_impl(id).await
    }

    /// 删除单元，其下作业与测验的 module_id 置空
    pub async fn delete_module_impl(&self, id: i64) -> Result<bool> {
        let result = CourseModules::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除课程单元失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
