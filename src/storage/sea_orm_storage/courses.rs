use super::SeaOrmStorage;
use crate::entity::course_users::{
    ActiveModel as CourseUserActiveModel, Column as CourseUserColumn, Entity as CourseUsers,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse,
    course_users::entities::CourseRole,
    courses::{
        entities::{Course, CourseStatus},
        requests::{CourseListQuery, NewCourse, UpdateCourseRequest},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课程，并在同一事务中把授课教师加入课程成员
    pub async fn create_course_impl(&self, req: NewCourse) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();
        let grading_scheme = serde_json::to_string(&req.grading_scheme)?;
        let instructor_id = req.instructor_id;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let course = ActiveModel {
            code: Set(req.code),
            name: Set(req.name),
            description: Set(req.description),
            credits: Set(req.credits),
            instructor_id: Set(instructor_id),
            major_id: Set(req.major_id),
            enrollment_key: Set(req.enrollment_key),
            status: Set(CourseStatus::Active.to_string()),
            grading_scheme: Set(grading_scheme),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建课程失败: {e}")))?;

        CourseUserActiveModel {
            course_id: Set(course.id),
            user_id: Set(instructor_id),
            role: Set(CourseRole::Teacher.to_string()),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("添加授课教师失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(course.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn get_course_by_code_impl(&self, code: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn get_course_by_enrollment_key_impl(&self, key: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::EnrollmentKey.eq(key))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn get_courses_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Courses::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("批量查询课程失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_course()).collect())
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Courses::find();

        // 仅列出某用户加入的课程
        if let Some(member_id) = query.member_id {
            let course_ids: Vec<i64> = CourseUsers::find()
                .select_only()
                .column(CourseUserColumn::CourseId)
                .filter(CourseUserColumn::UserId.eq(member_id))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| LmsError::database_operation(format!("查询用户课程失败: {e}")))?;

            if course_ids.is_empty() {
                return Ok(PaginatedResponse::new(Vec::new(), page, size, 0));
            }

            select = select.filter(Column::Id.is_in(course_ids));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Code.contains(&escaped))
                    .add(Column::Name.contains(&escaped)),
            );
        }

        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程总数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(PaginatedResponse::new(
            courses.into_iter().map(|m| m.into_course()).collect(),
            page,
            size,
            total,
        ))
    }

    /// 更新课程；`enrollment_key` 非空时替换选课密钥
    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
        enrollment_key: Option<String>,
    ) -> Result<Option<Course>> {
        if self.get_course_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(credits) = update.credits {
            model.credits = Set(credits);
        }

        if let Some(major_id) = update.major_id {
            model.major_id = Set(Some(major_id));
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        if let Some(ref scheme) = update.grading_scheme {
            model.grading_scheme = Set(serde_json::to_string(scheme)?);
        }

        if let Some(key) = enrollment_key {
            model.enrollment_key = Set(key);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新课程失败: {e}")))?;

        self.get_course_by_id_impl(id).await
    }

    /// 删除课程，成员、单元、作业、测验、成绩与论坛级联删除
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
