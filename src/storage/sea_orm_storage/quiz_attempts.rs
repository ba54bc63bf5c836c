use super::SeaOrmStorage;
use crate::entity::quiz_attempts::{ActiveModel, Column, Entity as QuizAttempts};
use crate::errors::{LmsError, Result};
use crate::models::quizzes::{
    entities::{AttemptAnswer, AttemptStatus, QuizAttempt},
    requests::NewQuizAttempt,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建作答，题目快照在此时写入且之后不再修改
    pub async fn create_attempt_impl(&self, req: NewQuizAttempt) -> Result<QuizAttempt> {
        let snapshot = serde_json::to_string(&req.questions_snapshot)?;
        let answers = serde_json::to_string(&Vec::<AttemptAnswer>::new())?;

        let model = ActiveModel {
            quiz_id: Set(req.quiz_id),
            student_id: Set(req.student_id),
            attempt_number: Set(req.attempt_number),
            questions_snapshot: Set(snapshot),
            answers: Set(answers),
            status: Set(AttemptStatus::InProgress.to_string()),
            score: Set(None),
            total_points: Set(req.total_points),
            percentage: Set(None),
            passed: Set(None),
            auto_submitted: Set(false),
            started_at: Set(req.started_at.timestamp()),
            deadline_at: Set(req.deadline_at.map(|d| d.timestamp())),
            submitted_at: Set(None),
            graded_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建测验作答失败: {e}")))?;

        Ok(result.into_attempt())
    }

    pub async fn get_attempt_by_id_impl(&self, id: i64) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询测验作答失败: {e}")))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    pub async fn get_in_progress_attempt_impl(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(AttemptStatus::InProgress.to_string()))
            .order_by_desc(Column::AttemptNumber)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询进行中的作答失败: {e}")))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    pub async fn get_max_quiz_attempt_number_impl(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<i32> {
        let latest = QuizAttempts::find()
            .filter(Column::QuizId.eq(quiz_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::AttemptNumber)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作答次数失败: {e}")))?;

        Ok(latest.map(|m| m.attempt_number).unwrap_or(0))
    }

    /// 写回作答的可变字段；题目快照与开始时间保持不变
    pub async fn save_attempt_impl(&self, attempt: &QuizAttempt) -> Result<QuizAttempt> {
        let answers = serde_json::to_string(&attempt.answers)?;

        let model = ActiveModel {
            id: Set(attempt.id),
            answers: Set(answers),
            status: Set(attempt.status.to_string()),
            score: Set(attempt.score),
            percentage: Set(attempt.percentage),
            passed: Set(attempt.passed),
            auto_submitted: Set(attempt.auto_submitted),
            submitted_at: Set(attempt.submitted_at.map(|d| d.timestamp())),
            graded_at: Set(attempt.graded_at.map(|d| d.timestamp())),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("保存测验作答失败: {e}")))?;

        Ok(result.into_attempt())
    }

    pub async fn list_attempts_impl(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        let mut select = QuizAttempts::find().filter(Column::QuizId.eq(quiz_id));

        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let result = select
            .order_by_asc(Column::StudentId)
            .order_by_asc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作答列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_attempt()).collect())
    }

    pub async fn list_attempts_by_quizzes_impl(
        &self,
        quiz_ids: &[i64],
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        if quiz_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = QuizAttempts::find().filter(Column::QuizId.is_in(quiz_ids.iter().copied()));

        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let result = select
            .order_by_asc(Column::QuizId)
            .order_by_asc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作答列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_attempt()).collect())
    }
}
