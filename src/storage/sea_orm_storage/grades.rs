use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::entity::manual_grades::{
    ActiveModel as ManualGradeActiveModel, Column as ManualGradeColumn, Entity as ManualGrades,
};
use crate::errors::{LmsError, Result};
use crate::models::gradebook::{
    entities::{Grade, ManualGrade},
    requests::{CreateManualGradeRequest, GradeRecord},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 写入成绩汇总，已存在则整体覆盖
    pub async fn upsert_grade_impl(&self, record: GradeRecord) -> Result<Grade> {
        let items = serde_json::to_string(&record.items)?;

        let existing = Grades::find()
            .filter(Column::CourseId.eq(record.course_id))
            .filter(Column::StudentId.eq(record.student_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询成绩失败: {e}")))?;

        let mut model = ActiveModel {
            course_id: Set(record.course_id),
            student_id: Set(record.student_id),
            items: Set(items),
            total_earned: Set(record.total_earned),
            total_possible: Set(record.total_possible),
            current_grade: Set(record.current_grade),
            letter_grade: Set(record.letter_grade),
            status: Set(record.status.to_string()),
            calculated_at: Set(record.calculated_at.timestamp()),
            ..Default::default()
        };

        let result = match existing {
            Some(existing) => {
                model.id = Set(existing.id);
                model
                    .update(&self.db)
                    .await
                    .map_err(|e| LmsError::database_operation(format!("更新成绩失败: {e}")))?
            }
            None => model
                .insert(&self.db)
                .await
                .map_err(|e| LmsError::database_operation(format!("写入成绩失败: {e}")))?,
        };

        Ok(result.into_grade())
    }

    pub async fn get_grade_impl(&self, course_id: i64, student_id: i64) -> Result<Option<Grade>> {
        let result = Grades::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_grade()))
    }

    pub async fn list_course_grades_impl(&self, course_id: i64) -> Result<Vec<Grade>> {
        let result = Grades::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程成绩失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_grade()).collect())
    }

    pub async fn create_manual_grade_impl(
        &self,
        course_id: i64,
        created_by: i64,
        req: CreateManualGradeRequest,
    ) -> Result<ManualGrade> {
        let model = ManualGradeActiveModel {
            course_id: Set(course_id),
            student_id: Set(req.student_id),
            title: Set(req.title),
            category: Set(req.category.to_string()),
            earned: Set(req.earned),
            possible: Set(req.possible),
            comment: Set(req.comment),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建手动成绩失败: {e}")))?;

        Ok(result.into_manual_grade())
    }

    pub async fn get_manual_grade_by_id_impl(&self, id: i64) -> Result<Option<ManualGrade>> {
        let result = ManualGrades::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询手动成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_manual_grade()))
    }

    pub async fn list_manual_grades_impl(
        &self,
        course_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<ManualGrade>> {
        let mut select = ManualGrades::find().filter(ManualGradeColumn::CourseId.eq(course_id));

        if let Some(student_id) = student_id {
            select = select.filter(ManualGradeColumn::StudentId.eq(student_id));
        }

        let result = select
            .order_by_asc(ManualGradeColumn::StudentId)
            .order_by_asc(ManualGradeColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询手动成绩列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_manual_grade()).collect())
    }

    pub async fn delete_manual_grade_impl(&self, id: i64) -> Result<bool> {
        let result = ManualGrades::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除手动成绩失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
