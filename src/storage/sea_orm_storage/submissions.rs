use std::collections::HashSet;

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    submissions::{
        entities::{Submission, SubmissionStatus},
        requests::{NewSubmission, SubmissionListQuery},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_submission_impl(&self, req: NewSubmission) -> Result<Submission> {
        let model = ActiveModel {
            assignment_id: Set(req.assignment_id),
            student_id: Set(req.student_id),
            attempt_number: Set(req.attempt_number),
            content: Set(req.content),
            status: Set(req.status.to_string()),
            is_late: Set(req.is_late),
            grade: Set(None),
            feedback: Set(None),
            graded_by: Set(None),
            graded_at: Set(None),
            submitted_at: Set(req.submitted_at.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建提交失败: {e}")))?;

        Ok(result.into_submission())
    }

    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn get_max_attempt_number_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<i32> {
        let latest = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::AttemptNumber)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交次数失败: {e}")))?;

        Ok(latest.map(|m| m.attempt_number).unwrap_or(0))
    }

    /// 学生在某作业上的全部提交，最新的在前
    pub async fn list_student_submissions_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 分页列出作业的提交
    ///
    /// `latest_only` 时每个学生只保留 attempt_number 最大的一条。
    pub async fn list_submissions_with_pagination_impl(
        &self,
        assignment_id: i64,
        query: SubmissionListQuery,
    ) -> Result<PaginatedResponse<Submission>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Submissions::find().filter(Column::AssignmentId.eq(assignment_id));

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if !query.latest_only {
            let paginator = select
                .order_by_desc(Column::SubmittedAt)
                .order_by_desc(Column::Id)
                .paginate(&self.db, size);
            let total = paginator
                .num_items()
                .await
                .map_err(|e| LmsError::database_operation(format!("查询提交总数失败: {e}")))?;
            let items = paginator
                .fetch_page(page - 1)
                .await
                .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

            return Ok(PaginatedResponse::new(
                items.into_iter().map(|m| m.into_submission()).collect(),
                page,
                size,
                total,
            ));
        }

        let all = select
            .order_by_asc(Column::StudentId)
            .order_by_desc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

        let mut seen = HashSet::new();
        let mut latest: Vec<Submission> = all
            .into_iter()
            .filter(|m| seen.insert(m.student_id))
            .map(|m| m.into_submission())
            .collect();
        latest.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));

        let total = latest.len() as u64;
        let items = latest
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .collect();

        Ok(PaginatedResponse::new(items, page, size, total))
    }

    pub async fn list_submissions_by_assignments_impl(
        &self,
        assignment_ids: &[i64],
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select =
            Submissions::find().filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()));

        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let result = select
            .order_by_asc(Column::AssignmentId)
            .order_by_asc(Column::StudentId)
            .order_by_asc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_submission()).collect())
    }

    pub async fn grade_submission_impl(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        if self.get_submission_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            status: Set(SubmissionStatus::Graded.to_string()),
            grade: Set(Some(grade)),
            feedback: Set(feedback),
            graded_by: Set(Some(graded_by)),
            graded_at: Set(Some(chrono::Utc::now().timestamp())),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("批改提交失败: {e}")))?;

        self.get_submission_by_id_impl(id).await
    }

    /// 更新提交状态；`feedback` 为空时保留原评语
    pub async fn update_submission_status_impl(
        &self,
        id: i64,
        status: SubmissionStatus,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        if self.get_submission_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            ..Default::default()
        };

        if let Some(feedback) = feedback {
            model.feedback = Set(Some(feedback));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新提交状态失败: {e}")))?;

        self.get_submission_by_id_impl(id).await
    }
}
