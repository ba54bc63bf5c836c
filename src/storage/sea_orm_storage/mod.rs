//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod course_users;
mod courses;
mod forum;
mod grades;
mod majors;
mod modules;
mod notifications;
mod quiz_attempts;
mod quizzes;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按 AppConfig 创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM storage initialized, database: {}", db_url);
        Ok(storage)
    }

    /// 使用已建立的连接创建存储实例并执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| LmsError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LmsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型并构建连接 URL
    pub(crate) fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LmsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    course_users::{
        entities::{CourseRole, CourseUser},
        requests::CourseUserListQuery,
    },
    courses::{
        entities::Course,
        requests::{CourseListQuery, NewCourse, UpdateCourseRequest},
    },
    forum::{
        entities::{Comment, ForumPost},
        requests::{CreateCommentRequest, CreatePostRequest, PostListQuery, UpdatePostRequest},
    },
    gradebook::{
        entities::{Grade, ManualGrade},
        requests::{CreateManualGradeRequest, GradeRecord},
    },
    majors::{
        entities::{Curriculum, Major},
        requests::{
            CreateCurriculumRequest, CreateMajorRequest, UpdateCurriculumRequest,
            UpdateMajorRequest,
        },
    },
    modules::{
        entities::CourseModule,
        requests::{CreateModuleRequest, UpdateModuleRequest},
    },
    notifications::{
        entities::Notification,
        requests::{NewNotification, NotificationListQuery},
    },
    quizzes::{
        entities::{Quiz, QuizAttempt},
        requests::{CreateQuizRequest, NewQuizAttempt, QuizListQuery, UpdateQuizRequest},
    },
    submissions::{
        entities::{Submission, SubmissionStatus},
        requests::{NewSubmission, SubmissionListQuery},
    },
    users::{
        entities::User,
        requests::{NewUser, UpdateUserRequest, UserListQuery},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(
        &self,
        query: UserListQuery,
    ) -> Result<PaginatedResponse<User>> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 专业模块
    async fn create_major(&self, major: CreateMajorRequest) -> Result<Major> {
        self.create_major_impl(major).await
    }

    async fn get_major_by_id(&self, id: i64) -> Result<Option<Major>> {
        self.get_major_by_id_impl(id).await
    }

    async fn list_majors(&self) -> Result<Vec<Major>> {
        self.list_majors_impl().await
    }

    async fn update_major(&self, id: i64, update: UpdateMajorRequest) -> Result<Option<Major>> {
        self.update_major_impl(id, update).await
    }

    async fn delete_major(&self, id: i64) -> Result<bool> {
        self.delete_major_impl(id).await
    }

    async fn create_curriculum(
        &self,
        major_id: i64,
        curriculum: CreateCurriculumRequest,
    ) -> Result<Curriculum> {
        self.create_curriculum_impl(major_id, curriculum).await
    }

    async fn get_curriculum_by_id(&self, id: i64) -> Result<Option<Curriculum>> {
        self.get_curriculum_by_id_impl(id).await
    }

    async fn list_curriculums_by_major(&self, major_id: i64) -> Result<Vec<Curriculum>> {
        self.list_curriculums_by_major_impl(major_id).await
    }

    async fn update_curriculum(
        &self,
        id: i64,
        update: UpdateCurriculumRequest,
    ) -> Result<Option<Curriculum>> {
        self.update_curriculum_impl(id, update).await
    }

    async fn delete_curriculum(&self, id: i64) -> Result<bool> {
        self.delete_curriculum_impl(id).await
    }

    // 课程模块
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.get_course_by_code_impl(code).await
    }

    async fn get_course_by_enrollment_key(&self, key: &str) -> Result<Option<Course>> {
        self.get_course_by_enrollment_key_impl(key).await
    }

    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>> {
        self.get_courses_by_ids_impl(ids).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(
        &self,
        id: i64,
        update: UpdateCourseRequest,
        enrollment_key: Option<String>,
    ) -> Result<Option<Course>> {
        self.update_course_impl(id, update, enrollment_key).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    // 课程成员模块
    async fn add_course_user(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<CourseUser> {
        self.add_course_user_impl(course_id, user_id, role).await
    }

    async fn get_course_user(&self, course_id: i64, user_id: i64) -> Result<Option<CourseUser>> {
        self.get_course_user_impl(course_id, user_id).await
    }

    async fn list_course_users_with_pagination(
        &self,
        course_id: i64,
        query: CourseUserListQuery,
    ) -> Result<PaginatedResponse<CourseUser>> {
        self.list_course_users_with_pagination_impl(course_id, query)
            .await
    }

    async fn list_course_students(&self, course_id: i64) -> Result<Vec<CourseUser>> {
        self.list_course_students_impl(course_id).await
    }

    async fn list_user_memberships(&self, user_id: i64) -> Result<Vec<CourseUser>> {
        self.list_user_memberships_impl(user_id).await
    }

    async fn update_course_user_role(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<Option<CourseUser>> {
        self.update_course_user_role_impl(course_id, user_id, role)
            .await
    }

    async fn remove_course_user(&self, course_id: i64, user_id: i64) -> Result<bool> {
        self.remove_course_user_impl(course_id, user_id).await
    }

    async fn count_course_users(&self, course_id: i64) -> Result<u64> {
        self.count_course_users_impl(course_id).await
    }

    // 课程单元模块
    async fn create_module(
        &self,
        course_id: i64,
        module: CreateModuleRequest,
    ) -> Result<CourseModule> {
        self.create_module_impl(course_id, module).await
    }

    async fn get_module_by_id(&self, id: i64) -> Result<Option<CourseModule>> {
        self.get_module_by_id_impl(id).await
    }

    async fn list_modules(&self, course_id: i64, published_only: bool) -> Result<Vec<CourseModule>> {
        self.list_modules_impl(course_id, published_only).await
    }

    async fn update_module(
        &self,
        id: i64,
        update: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>> {
        self.update_module_impl(id, update).await
    }

    async fn delete_module(&self, id: i64) -> Result<bool> {
        self.delete_module_impl(id).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        course_id: i64,
        created_by: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        self.create_assignment_impl(course_id, created_by, assignment)
            .await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        course_id: i64,
        query: AssignmentListQuery,
    ) -> Result<PaginatedResponse<Assignment>> {
        self.list_assignments_with_pagination_impl(course_id, query)
            .await
    }

    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.list_course_assignments_impl(course_id).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    // 提交模块
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_max_attempt_number(&self, assignment_id: i64, student_id: i64) -> Result<i32> {
        self.get_max_attempt_number_impl(assignment_id, student_id)
            .await
    }

    async fn list_student_submissions(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>> {
        self.list_student_submissions_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions_with_pagination(
        &self,
        assignment_id: i64,
        query: SubmissionListQuery,
    ) -> Result<PaginatedResponse<Submission>> {
        self.list_submissions_with_pagination_impl(assignment_id, query)
            .await
    }

    async fn list_submissions_by_assignments(
        &self,
        assignment_ids: &[i64],
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_assignments_impl(assignment_ids, student_id)
            .await
    }

    async fn grade_submission(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade, feedback, graded_by)
            .await
    }

    async fn update_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        self.update_submission_status_impl(id, status, feedback)
            .await
    }

    // 测验模块
    async fn create_quiz(
        &self,
        course_id: i64,
        created_by: i64,
        quiz: CreateQuizRequest,
    ) -> Result<Quiz> {
        self.create_quiz_impl(course_id, created_by, quiz).await
    }

    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(id).await
    }

    async fn list_quizzes_with_pagination(
        &self,
        course_id: i64,
        query: QuizListQuery,
    ) -> Result<PaginatedResponse<Quiz>> {
        self.list_quizzes_with_pagination_impl(course_id, query)
            .await
    }

    async fn list_course_quizzes(&self, course_id: i64) -> Result<Vec<Quiz>> {
        self.list_course_quizzes_impl(course_id).await
    }

    async fn update_quiz(&self, id: i64, update: UpdateQuizRequest) -> Result<Option<Quiz>> {
        self.update_quiz_impl(id, update).await
    }

    async fn delete_quiz(&self, id: i64) -> Result<bool> {
        self.delete_quiz_impl(id).await
    }

    // 测验作答模块
    async fn create_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt> {
        self.create_attempt_impl(attempt).await
    }

    async fn get_attempt_by_id(&self, id: i64) -> Result<Option<QuizAttempt>> {
        self.get_attempt_by_id_impl(id).await
    }

    async fn get_in_progress_attempt(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizAttempt>> {
        self.get_in_progress_attempt_impl(quiz_id, student_id).await
    }

    async fn get_max_quiz_attempt_number(&self, quiz_id: i64, student_id: i64) -> Result<i32> {
        self.get_max_quiz_attempt_number_impl(quiz_id, student_id)
            .await
    }

    async fn save_attempt(&self, attempt: &QuizAttempt) -> Result<QuizAttempt> {
        self.save_attempt_impl(attempt).await
    }

    async fn list_attempts(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        self.list_attempts_impl(quiz_id, student_id).await
    }

    async fn list_attempts_by_quizzes(
        &self,
        quiz_ids: &[i64],
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        self.list_attempts_by_quizzes_impl(quiz_ids, student_id)
            .await
    }

    // 成绩模块
    async fn upsert_grade(&self, record: GradeRecord) -> Result<Grade> {
        self.upsert_grade_impl(record).await
    }

    async fn get_grade(&self, course_id: i64, student_id: i64) -> Result<Option<Grade>> {
        self.get_grade_impl(course_id, student_id).await
    }

    async fn list_course_grades(&self, course_id: i64) -> Result<Vec<Grade>> {
        self.list_course_grades_impl(course_id).await
    }

    async fn create_manual_grade(
        &self,
        course_id: i64,
        created_by: i64,
        entry: CreateManualGradeRequest,
    ) -> Result<ManualGrade> {
        self.create_manual_grade_impl(course_id, created_by, entry)
            .await
    }

    async fn get_manual_grade_by_id(&self, id: i64) -> Result<Option<ManualGrade>> {
        self.get_manual_grade_by_id_impl(id).await
    }

    async fn list_manual_grades(
        &self,
        course_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<ManualGrade>> {
        self.list_manual_grades_impl(course_id, student_id).await
    }

    async fn delete_manual_grade(&self, id: i64) -> Result<bool> {
        self.delete_manual_grade_impl(id).await
    }

    // 论坛模块
    async fn create_post(
        &self,
        course_id: i64,
        author_id: i64,
        post: CreatePostRequest,
    ) -> Result<ForumPost> {
        self.create_post_impl(course_id, author_id, post).await
    }

    async fn get_post_by_id(&self, id: i64) -> Result<Option<ForumPost>> {
        self.get_post_by_id_impl(id).await
    }

    async fn list_posts_with_pagination(
        &self,
        course_id: i64,
        query: PostListQuery,
    ) -> Result<PaginatedResponse<ForumPost>> {
        self.list_posts_with_pagination_impl(course_id, query).await
    }

    async fn update_post(&self, id: i64, update: UpdatePostRequest) -> Result<Option<ForumPost>> {
        self.update_post_impl(id, update).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        self.delete_post_impl(id).await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        comment: CreateCommentRequest,
    ) -> Result<Comment> {
        self.create_comment_impl(post_id, author_id, comment).await
    }

    async fn get_comment_by_id(&self, id: i64) -> Result<Option<Comment>> {
        self.get_comment_by_id_impl(id).await
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.list_comments_impl(post_id).await
    }

    async fn count_comments(&self, post_id: i64) -> Result<u64> {
        self.count_comments_impl(post_id).await
    }

    async fn delete_comments(&self, ids: &[i64]) -> Result<u64> {
        self.delete_comments_impl(ids).await
    }

    // 通知模块
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.create_notification_impl(notification).await
    }

    async fn create_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64> {
        self.create_notifications_impl(notifications).await
    }

    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>> {
        self.get_notification_by_id_impl(id).await
    }

    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<PaginatedResponse<Notification>> {
        self.list_notifications_with_pagination_impl(user_id, query)
            .await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<u64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn mark_notification_read(&self, id: i64) -> Result<bool> {
        self.mark_notification_read_impl(id).await
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<u64> {
        self.mark_all_notifications_read_impl(user_id).await
    }

    async fn delete_notification(&self, id: i64) -> Result<bool> {
        self.delete_notification_impl(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::SeaOrmStorage;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("lms.db").unwrap(),
            "sqlite://lms.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/lms").unwrap(),
            "postgres://u:p@localhost/lms"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
