use super::SeaOrmStorage;
use crate::entity::quizzes::{ActiveModel, Column, Entity as Quizzes};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    courses::entities::GradeCategory,
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, QuizListQuery, UpdateQuizRequest},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_quiz_impl(
        &self,
        course_id: i64,
        created_by: i64,
        req: CreateQuizRequest,
    ) -> Result<Quiz> {
        let now = chrono::Utc::now().timestamp();
        let questions = serde_json::to_string(&req.questions)?;

        let model = ActiveModel {
            course_id: Set(course_id),
            module_id: Set(req.module_id),
            created_by: Set(created_by),
            title: Set(req.title),
            description: Set(req.description),
            questions: Set(questions),
            time_limit_minutes: Set(req.time_limit_minutes),
            max_attempts: Set(req.max_attempts),
            passing_score: Set(req.passing_score),
            show_answers_after: Set(req.show_answers_after.to_string()),
            available_from: Set(req.available_from.map(|d| d.timestamp())),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            is_published: Set(req.is_published),
            category: Set(req.category.unwrap_or(GradeCategory::Quizzes).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建测验失败: {e}")))?;

        Ok(result.into_quiz())
    }

    pub async fn get_quiz_by_id_impl(&self, id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    pub async fn list_quizzes_with_pagination_impl(
        &self,
        course_id: i64,
        query: QuizListQuery,
    ) -> Result<PaginatedResponse<Quiz>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Quizzes::find().filter(Column::CourseId.eq(course_id));

        if let Some(module_id) = query.module_id {
            select = select.filter(Column::ModuleId.eq(module_id));
        }

        if query.published_only {
            select = select.filter(Column::IsPublished.eq(true));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验总数失败: {e}")))?;

        let quizzes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            quizzes.into_iter().map(|m| m.into_quiz()).collect(),
            page,
            size,
            total,
        ))
    }

    pub async fn list_course_quizzes_impl(&self, course_id: i64) -> Result<Vec<Quiz>> {
        let result = Quizzes::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程测验失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_quiz()).collect())
    }

    pub async fn update_quiz_impl(&self, id: i64, update: UpdateQuizRequest) -> Result<Option<Quiz>> {
        if self.get_quiz_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(module_id) = update.module_id {
            model.module_id = Set(Some(module_id));
        }

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(ref questions) = update.questions {
            model.questions = Set(serde_json::to_string(questions)?);
        }

        if update.clear_time_limit {
            model.time_limit_minutes = Set(None);
        } else if let Some(minutes) = update.time_limit_minutes {
            model.time_limit_minutes = Set(Some(minutes));
        }

        if update.clear_max_attempts {
            model.max_attempts = Set(None);
        } else if let Some(max_attempts) = update.max_attempts {
            model.max_attempts = Set(Some(max_attempts));
        }

        if let Some(passing_score) = update.passing_score {
            model.passing_score = Set(passing_score);
        }

        if let Some(show) = update.show_answers_after {
            model.show_answers_after = Set(show.to_string());
        }

        if let Some(available_from) = update.available_from {
            model.available_from = Set(Some(available_from.timestamp()));
        }

        if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }

        if let Some(is_published) = update.is_published {
            model.is_published = Set(is_published);
        }

        if let Some(category) = update.category {
            model.category = Set(category.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新测验失败: {e}")))?;

        self.get_quiz_by_id_impl(id).await
    }

    /// 删除测验，作答记录级联删除
    pub async fn delete_quiz_impl(&self, id: i64) -> Result<bool> {
        let result = Quizzes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除测验失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
