use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    courses::entities::GradeCategory,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_assignment_impl(
        &self,
        course_id: i64,
        created_by: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            module_id: Set(req.module_id),
            created_by: Set(created_by),
            title: Set(req.title),
            description: Set(req.description),
            max_grade: Set(req.max_grade),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            allow_late: Set(req.allow_late),
            category: Set(req
                .category
                .unwrap_or(GradeCategory::Assignments)
                .to_string()),
            max_attempts: Set(req.max_attempts),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分页列出课程作业，按截止时间升序，无截止时间的排在最后
    pub async fn list_assignments_with_pagination_impl(
        &self,
        course_id: i64,
        query: AssignmentListQuery,
    ) -> Result<PaginatedResponse<Assignment>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Assignments::find().filter(Column::CourseId.eq(course_id));

        if let Some(module_id) = query.module_id {
            select = select.filter(Column::ModuleId.eq(module_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }

        select = select
            .order_by_asc(Column::DueDate.is_null())
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业总数失败: {e}")))?;

        let assignments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            assignments.into_iter().map(|m| m.into_assignment()).collect(),
            page,
            size,
            total,
        ))
    }

    pub async fn list_course_assignments_impl(&self, course_id: i64) -> Result<Vec<Assignment>> {
        let result = Assignments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程作业失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }

    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        if self.get_assignment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if update.clear_module {
            model.module_id = Set(None);
        } else if let Some(module_id) = update.module_id {
            model.module_id = Set(Some(module_id));
        }

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(max_grade) = update.max_grade {
            model.max_grade = Set(max_grade);
        }

        if update.clear_due_date {
            model.due_date = Set(None);
        } else if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }

        if let Some(allow_late) = update.allow_late {
            model.allow_late = Set(allow_late);
        }

        if let Some(category) = update.category {
            model.category = Set(category.to_string());
        }

        if update.clear_max_attempts {
            model.max_attempts = Set(None);
        } else if let Some(max_attempts) = update.max_attempts {
            model.max_attempts = Set(Some(max_attempts));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新作业失败: {e}")))?;

        self.get_assignment_by_id_impl(id).await
    }

    /// 删除作业，提交记录级联删除
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
