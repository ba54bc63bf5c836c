use std::sync::Arc;

use crate::errors::Result;
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

pub mod sea_orm_storage;

pub use sea_orm_storage::SeaOrmStorage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn list_users_with_pagination(
        &self,
        query: UserListQuery,
    ) -> Result<PaginatedResponse<User>>;
    /// `update.password` 必须已是哈希值
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;

    /// 专业与培养方案
    async fn create_major(&self, major: CreateMajorRequest) -> Result<Major>;
    async fn get_major_by_id(&self, id: i64) -> Result<Option<Major>>;
    async fn list_majors(&self) -> Result<Vec<Major>>;
    async fn update_major(&self, id: i64, update: UpdateMajorRequest) -> Result<Option<Major>>;
    async fn delete_major(&self, id: i64) -> Result<bool>;
    async fn create_curriculum(
        &self,
        major_id: i64,
        curriculum: CreateCurriculumRequest,
    ) -> Result<Curriculum>;
    async fn get_curriculum_by_id(&self, id: i64) -> Result<Option<Curriculum>>;
    async fn list_curriculums_by_major(&self, major_id: i64) -> Result<Vec<Curriculum>>;
    async fn update_curriculum(
        &self,
        id: i64,
        update: UpdateCurriculumRequest,
    ) -> Result<Option<Curriculum>>;
    async fn delete_curriculum(&self, id: i64) -> Result<bool>;

    /// 课程；创建时授课教师同时以 teacher 身份加入课程
    async fn create_course(&self, course: NewCourse) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    async fn get_course_by_enrollment_key(&self, key: &str) -> Result<Option<Course>>;
    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>>;
    async fn update_course(
        &self,
        id: i64,
        update: UpdateCourseRequest,
        enrollment_key: Option<String>,
    ) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;

    /// 课程成员
    async fn add_course_user(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<CourseUser>;
    async fn get_course_user(&self, course_id: i64, user_id: i64) -> Result<Option<CourseUser>>;
    async fn list_course_users_with_pagination(
        &self,
        course_id: i64,
        query: CourseUserListQuery,
    ) -> Result<PaginatedResponse<CourseUser>>;
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<CourseUser>>;
    async fn list_user_memberships(&self, user_id: i64) -> Result<Vec<CourseUser>>;
    async fn update_course_user_role(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<Option<CourseUser>>;
    async fn remove_course_user(&self, course_id: i64, user_id: i64) -> Result<bool>;
    async fn count_course_users(&self, course_id: i64) -> Result<u64>;

    /// 课程单元
    async fn create_module(&self, course_id: i64, module: CreateModuleRequest)
    -> Result<CourseModule>;
    async fn get_module_by_id(&self, id: i64) -> Result<Option<CourseModule>>;
    async fn list_modules(&self, course_id: i64, published_only: bool) -> Result<Vec<CourseModule>>;
    async fn update_module(
        &self,
        id: i64,
        update: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>>;
    async fn delete_module(&self, id: i64) -> Result<bool>;

    /// 作业
    async fn create_assignment(
        &self,
        course_id: i64,
        created_by: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_with_pagination(
        &self,
        course_id: i64,
        query: AssignmentListQuery,
    ) -> Result<PaginatedResponse<Assignment>>;
    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;

    /// 提交
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    /// 学生在某作业上的最大 attempt_number，无提交时为 0
    async fn get_max_attempt_number(&self, assignment_id: i64, student_id: i64) -> Result<i32>;
    async fn list_student_submissions(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>>;
    async fn list_submissions_with_pagination(
        &self,
        assignment_id: i64,
        query: SubmissionListQuery,
    ) -> Result<PaginatedResponse<Submission>>;
    async fn list_submissions_by_assignments(
        &self,
        assignment_ids: &[i64],
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>>;
    async fn grade_submission(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>>;
    async fn update_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
        feedback: Option<String>,
    ) -> Result<Option<Submission>>;

    /// 测验
    async fn create_quiz(
        &self,
        course_id: i64,
        created_by: i64,
        quiz: CreateQuizRequest,
    ) -> Result<Quiz>;
    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>>;
    async fn list_quizzes_with_pagination(
        &self,
        course_id: i64,
        query: QuizListQuery,
    ) -> Result<PaginatedResponse<Quiz>>;
    async fn list_course_quizzes(&self, course_id: i64) -> Result<Vec<Quiz>>;
    async fn update_quiz(&self, id: i64, update: UpdateQuizRequest) -> Result<Option<Quiz>>;
    async fn delete_quiz(&self, id: i64) -> Result<bool>;

    /// 测验作答
    async fn create_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt>;
    async fn get_attempt_by_id(&self, id: i64) -> Result<Option<QuizAttempt>>;
    async fn get_in_progress_attempt(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizAttempt>>;
    async fn get_max_quiz_attempt_number(&self, quiz_id: i64, student_id: i64) -> Result<i32>;
    /// 写回作答的可变字段（答案、状态、得分与时间戳）
    async fn save_attempt(&self, attempt: &QuizAttempt) -> Result<QuizAttempt>;
    async fn list_attempts(&self, quiz_id: i64, student_id: Option<i64>)
    -> Result<Vec<QuizAttempt>>;
    async fn list_attempts_by_quizzes(
        &self,
        quiz_ids: &[i64],
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>>;

    /// 成绩汇总（按 course_id + student_id 覆盖写入）
    async fn upsert_grade(&self, record: GradeRecord) -> Result<Grade>;
    async fn get_grade(&self, course_id: i64, student_id: i64) -> Result<Option<Grade>>;
    async fn list_course_grades(&self, course_id: i64) -> Result<Vec<Grade>>;

    /// 手动成绩
    async fn create_manual_grade(
        &self,
        course_id: i64,
        created_by: i64,
        entry: CreateManualGradeRequest,
    ) -> Result<ManualGrade>;
    async fn get_manual_grade_by_id(&self, id: i64) -> Result<Option<ManualGrade>>;
    async fn list_manual_grades(
        &self,
        course_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<ManualGrade>>;
    async fn delete_manual_grade(&self, id: i64) -> Result<bool>;

    /// 论坛
    async fn create_post(
        &self,
        course_id: i64,
        author_id: i64,
        post: CreatePostRequest,
    ) -> Result<ForumPost>;
    async fn get_post_by_id(&self, id: i64) -> Result<Option<ForumPost>>;
    /// 置顶优先，其次按创建时间倒序
    async fn list_posts_with_pagination(
        &self,
        course_id: i64,
        query: PostListQuery,
    ) -> Result<PaginatedResponse<ForumPost>>;
    async fn update_post(&self, id: i64, update: UpdatePostRequest) -> Result<Option<ForumPost>>;
    /// 同时删除帖子下的全部评论
    async fn delete_post(&self, id: i64) -> Result<bool>;
    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        comment: CreateCommentRequest,
    ) -> Result<Comment>;
    async fn get_comment_by_id(&self, id: i64) -> Result<Option<Comment>>;
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>>;
    async fn count_comments(&self, post_id: i64) -> Result<u64>;
    async fn delete_comments(&self, ids: &[i64]) -> Result<u64>;

    /// 通知
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;
    async fn create_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64>;
    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>>;
    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<PaginatedResponse<Notification>>;
    async fn count_unread_notifications(&self, user_id: i64) -> Result<u64>;
    async fn mark_notification_read(&self, id: i64) -> Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<u64>;
    async fn delete_notification(&self, id: i64) -> Result<bool>;
}

/// 根据配置创建存储实例
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
