use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tables::{
    Assignments, Comments, CourseModules, CourseUsers, Courses, ForumPosts, Grades, ManualGrades,
    Notifications, QuizAttempts, Quizzes, Submissions, Users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // 课程索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_instructor_id")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await?;

        // 课程成员唯一约束：每个用户在同一课程中只有一条成员记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_users_course_user")
                    .table(CourseUsers::Table)
                    .col(CourseUsers::CourseId)
                    .col(CourseUsers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_users_user_id")
                    .table(CourseUsers::Table)
                    .col(CourseUsers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_modules_course_position")
                    .table(CourseModules::Table)
                    .col(CourseModules::CourseId)
                    .col(CourseModules::Position)
                    .to_owned(),
            )
            .await?;

        // 作业与提交索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_course_id")
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_assignment_student")
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .col(Submissions::StudentId)
                    .col(Submissions::AttemptNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 测验索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quizzes_course_id")
                    .table(Quizzes::Table)
                    .col(Quizzes::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_attempts_quiz_student")
                    .table(QuizAttempts::Table)
                    .col(QuizAttempts::QuizId)
                    .col(QuizAttempts::StudentId)
                    .col(QuizAttempts::AttemptNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 成绩汇总唯一约束：每个学生在每门课程只有一条汇总
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grades_course_student")
                    .table(Grades::Table)
                    .col(Grades::CourseId)
                    .col(Grades::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_manual_grades_course_student")
                    .table(ManualGrades::Table)
                    .col(ManualGrades::CourseId)
                    .col(ManualGrades::StudentId)
                    .to_owned(),
            )
            .await?;

        // 论坛索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_forum_posts_course_id")
                    .table(ForumPosts::Table)
                    .col(ForumPosts::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comments_post_id")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .to_owned(),
            )
            .await?;

        // 通知索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes = [
            ("idx_notifications_user_read", "notifications"),
            ("idx_comments_post_id", "comments"),
            ("idx_forum_posts_course_id", "forum_posts"),
            ("idx_manual_grades_course_student", "manual_grades"),
            ("idx_grades_course_student", "grades"),
            ("idx_quiz_attempts_quiz_student", "quiz_attempts"),
            ("idx_quizzes_course_id", "quizzes"),
            ("idx_submissions_assignment_student", "submissions"),
            ("idx_assignments_course_id", "assignments"),
            ("idx_course_modules_course_position", "course_modules"),
            ("idx_course_users_user_id", "course_users"),
            ("idx_course_users_course_user", "course_users"),
            ("idx_courses_instructor_id", "courses"),
            ("idx_users_role", "users"),
        ];

        for (name, table) in indexes {
            manager
                .drop_index(
                    Index::drop()
                        .if_exists()
                        .name(name)
                        .table(Alias::new(table))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
