//! 存储层集成测试：内存 SQLite + 真实迁移

use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, Database};

use lms_server::models::assignments::requests::CreateAssignmentRequest;
use lms_server::models::course_users::entities::CourseRole;
use lms_server::models::course_users::requests::CourseUserListQuery;
use lms_server::models::courses::entities::{Course, CourseStatus, GradeCategory, GradingScheme};
use lms_server::models::courses::requests::{CourseListQuery, NewCourse, UpdateCourseRequest};
use lms_server::models::forum::requests::{
    CreateCommentRequest, CreatePostRequest, PostListQuery, UpdatePostRequest,
};
use lms_server::models::gradebook::entities::{GradeItem, GradeItemSource, GradeStatus};
use lms_server::models::gradebook::requests::GradeRecord;
use lms_server::models::notifications::entities::NotificationType;
use lms_server::models::notifications::requests::{NewNotification, NotificationListQuery};
use lms_server::models::quizzes::entities::{
    AttemptAnswer, AttemptStatus, Question, QuestionType, ShowAnswersAfter,
};
use lms_server::models::quizzes::requests::{CreateQuizRequest, NewQuizAttempt};
use lms_server::models::submissions::entities::SubmissionStatus;
use lms_server::models::submissions::requests::{NewSubmission, SubmissionListQuery};
use lms_server::models::users::entities::{User, UserRole, UserStatus};
use lms_server::models::users::requests::NewUser;
use lms_server::storage::{SeaOrmStorage, Storage};

async fn setup() -> SeaOrmStorage {
    // 内存库每个连接相互独立，只保留一个连接
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    SeaOrmStorage::from_connection(db).await.unwrap()
}

async fn create_user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> User {
    storage
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role,
            status: UserStatus::Active,
            display_name: None,
            major_id: None,
        })
        .await
        .unwrap()
}

async fn create_course(storage: &SeaOrmStorage, code: &str, instructor_id: i64) -> Course {
    storage
        .create_course(NewCourse {
            code: code.to_string(),
            name: format!("Course {code}"),
            description: None,
            credits: 3,
            instructor_id,
            major_id: None,
            enrollment_key: format!("KEY{code}"),
            grading_scheme: GradingScheme::default(),
        })
        .await
        .unwrap()
}

fn submission(assignment_id: i64, student_id: i64, attempt: i32, minutes_ago: i64) -> NewSubmission {
    NewSubmission {
        assignment_id,
        student_id,
        attempt_number: attempt,
        content: format!("attempt {attempt}"),
        status: if attempt == 1 {
            SubmissionStatus::Submitted
        } else {
            SubmissionStatus::Resubmitted
        },
        is_late: false,
        submitted_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn test_user_lookup_by_username_or_email() {
    let storage = setup().await;
    let alice = create_user(&storage, "alice01", UserRole::Student).await;

    let by_name = storage.get_user_by_username_or_email("alice01").await.unwrap();
    let by_email = storage
        .get_user_by_username_or_email("alice01@example.com")
        .await
        .unwrap();
    assert_eq!(by_name.map(|u| u.id), Some(alice.id));
    assert_eq!(by_email.map(|u| u.id), Some(alice.id));
    assert_eq!(storage.count_users().await.unwrap(), 1);
    assert!(storage.get_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_course_creation_enrolls_instructor() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let course = create_course(&storage, "CS101", teacher.id).await;

    let membership = storage
        .get_course_user(course.id, teacher.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(membership.role, CourseRole::Teacher);
    assert_eq!(course.status, CourseStatus::Active);
    assert_eq!(course.grading_scheme, GradingScheme::default());

    storage
        .add_course_user(course.id, student.id, CourseRole::Student)
        .await
        .unwrap();
    assert_eq!(storage.count_course_users(course.id).await.unwrap(), 2);
    let students = storage.list_course_students(course.id).await.unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].user_id, student.id);

    let found = storage
        .get_course_by_enrollment_key("KEYCS101")
        .await
        .unwrap();
    assert_eq!(found.map(|c| c.id), Some(course.id));
}

#[tokio::test]
async fn test_course_list_filters_by_member() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let joined = create_course(&storage, "CS101", teacher.id).await;
    create_course(&storage, "CS102", teacher.id).await;
    storage
        .add_course_user(joined.id, student.id, CourseRole::Student)
        .await
        .unwrap();

    let mine = storage
        .list_courses_with_pagination(CourseListQuery {
            page: 1,
            size: 20,
            member_id: Some(student.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(mine.pagination.total, 1);
    assert_eq!(mine.items[0].id, joined.id);

    let all = storage
        .list_courses_with_pagination(CourseListQuery {
            page: 1,
            size: 20,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 2);
}

#[tokio::test]
async fn test_course_archive_and_member_roles() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let helper = create_user(&storage, "helper1", UserRole::Student).await;
    let course = create_course(&storage, "CS101", teacher.id).await;
    storage
        .add_course_user(course.id, helper.id, CourseRole::Student)
        .await
        .unwrap();

    let promoted = storage
        .update_course_user_role(course.id, helper.id, CourseRole::Assistant)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, CourseRole::Assistant);

    let staff = storage
        .list_course_users_with_pagination(
            course.id,
            CourseUserListQuery {
                page: 1,
                size: 20,
                role: Some(CourseRole::Assistant),
                search: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(staff.items.len(), 1);

    let archived = storage
        .update_course(
            course.id,
            UpdateCourseRequest {
                name: None,
                description: None,
                credits: None,
                major_id: None,
                status: Some(CourseStatus::Archived),
                grading_scheme: None,
                regenerate_enrollment_key: false,
            },
            None,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(archived.status, CourseStatus::Archived);

    assert!(storage.remove_course_user(course.id, helper.id).await.unwrap());
    assert!(storage.get_course_user(course.id, helper.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_submissions_latest_per_student() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let s1 = create_user(&storage, "student1", UserRole::Student).await;
    let s2 = create_user(&storage, "student2", UserRole::Student).await;
    let course = create_course(&storage, "CS101", teacher.id).await;
    let assignment = storage
        .create_assignment(
            course.id,
            teacher.id,
            CreateAssignmentRequest {
                module_id: None,
                title: "Essay".to_string(),
                description: None,
                max_grade: 100.0,
                due_date: None,
                allow_late: true,
                category: None,
                max_attempts: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(assignment.category, GradeCategory::Assignments);

    storage.create_submission(submission(assignment.id, s1.id, 1, 30)).await.unwrap();
    let latest = storage
        .create_submission(submission(assignment.id, s1.id, 2, 10))
        .await
        .unwrap();
    storage.create_submission(submission(assignment.id, s2.id, 1, 20)).await.unwrap();

    assert_eq!(
        storage.get_max_attempt_number(assignment.id, s1.id).await.unwrap(),
        2
    );
    assert_eq!(
        storage.get_max_attempt_number(assignment.id, teacher.id).await.unwrap(),
        0
    );

    let latest_only = storage
        .list_submissions_with_pagination(
            assignment.id,
            SubmissionListQuery {
                page: 1,
                size: 20,
                latest_only: true,
                student_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(latest_only.pagination.total, 2);
    assert!(latest_only.items.iter().any(|s| s.id == latest.id));

    let history = storage
        .list_submissions_with_pagination(
            assignment.id,
            SubmissionListQuery {
                page: 1,
                size: 20,
                latest_only: false,
                student_id: Some(s1.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(history.pagination.total, 2);
}

#[tokio::test]
async fn test_grade_and_return_submission() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let course = create_course(&storage, "CS101", teacher.id).await;
    let assignment = storage
        .create_assignment(
            course.id,
            teacher.id,
            CreateAssignmentRequest {
                module_id: None,
                title: "Lab".to_string(),
                description: None,
                max_grade: 50.0,
                due_date: None,
                allow_late: false,
                category: Some(GradeCategory::Midterm),
                max_attempts: Some(2),
            },
        )
        .await
        .unwrap();
    let created = storage
        .create_submission(submission(assignment.id, student.id, 1, 5))
        .await
        .unwrap();

    let graded = storage
        .grade_submission(created.id, 42.5, Some("good".to_string()), teacher.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(graded.status, SubmissionStatus::Graded);
    assert_eq!(graded.grade, Some(42.5));
    assert_eq!(graded.graded_by, Some(teacher.id));
    assert!(graded.graded_at.is_some());

    let returned = storage
        .update_submission_status(created.id, SubmissionStatus::Returned, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(returned.status, SubmissionStatus::Returned);
}

#[tokio::test]
async fn test_quiz_attempt_json_round_trip() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let course = create_course(&storage, "CS101", teacher.id).await;

    let questions = vec![
        Question {
            id: "q1".to_string(),
            question_type: QuestionType::TrueFalse,
            text: "Rust has a borrow checker".to_string(),
            options: vec![],
            correct_answer: Some("true".to_string()),
            accepted_answers: vec![],
            case_sensitive: false,
            points: 2.0,
        },
        Question {
            id: "q2".to_string(),
            question_type: QuestionType::Essay,
            text: "Explain ownership".to_string(),
            options: vec![],
            correct_answer: None,
            accepted_answers: vec![],
            case_sensitive: false,
            points: 8.0,
        },
    ];
    let quiz = storage
        .create_quiz(
            course.id,
            teacher.id,
            CreateQuizRequest {
                module_id: None,
                title: "Quiz 1".to_string(),
                description: None,
                questions: questions.clone(),
                time_limit_minutes: Some(15),
                max_attempts: Some(1),
                passing_score: 60.0,
                show_answers_after: ShowAnswersAfter::AfterDueDate,
                available_from: None,
                due_date: None,
                is_published: true,
                category: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(quiz.category, GradeCategory::Quizzes);

    let started = Utc::now();
    let mut attempt = storage
        .create_attempt(NewQuizAttempt {
            quiz_id: quiz.id,
            student_id: student.id,
            attempt_number: 1,
            questions_snapshot: questions,
            total_points: 10.0,
            started_at: started,
            deadline_at: Some(started + Duration::minutes(15)),
        })
        .await
        .unwrap();
    assert_eq!(attempt.status, AttemptStatus::InProgress);

    let in_progress = storage
        .get_in_progress_attempt(quiz.id, student.id)
        .await
        .unwrap();
    assert_eq!(in_progress.map(|a| a.id), Some(attempt.id));

    attempt.answers = vec![AttemptAnswer {
        question_id: "q1".to_string(),
        answer: Some("true".to_string()),
        is_correct: Some(true),
        points_awarded: Some(2.0),
        feedback: None,
    }];
    attempt.status = AttemptStatus::Submitted;
    attempt.score = Some(2.0);
    attempt.submitted_at = Some(Utc::now());
    storage.save_attempt(&attempt).await.unwrap();

    let reloaded = storage.get_attempt_by_id(attempt.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, AttemptStatus::Submitted);
    assert_eq!(reloaded.answers.len(), 1);
    assert_eq!(reloaded.answers[0].points_awarded, Some(2.0));
    assert_eq!(reloaded.questions_snapshot[1].question_type, QuestionType::Essay);
    assert!(
        storage
            .get_in_progress_attempt(quiz.id, student.id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        storage
            .get_max_quiz_attempt_number(quiz.id, student.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_upsert_grade_overwrites() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let course = create_course(&storage, "CS101", teacher.id).await;

    let record = |earned: f64, status: GradeStatus| GradeRecord {
        course_id: course.id,
        student_id: student.id,
        items: vec![GradeItem {
            source: GradeItemSource::Manual,
            source_id: 1,
            title: "Participation".to_string(),
            category: GradeCategory::Assignments,
            earned: Some(earned),
            possible: 10.0,
        }],
        total_earned: earned,
        total_possible: 10.0,
        current_grade: Some(earned * 10.0),
        letter_grade: None,
        status,
        calculated_at: Utc::now(),
    };

    let first = storage
        .upsert_grade(record(4.0, GradeStatus::Failing))
        .await
        .unwrap();
    let second = storage
        .upsert_grade(record(9.0, GradeStatus::Passing))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let stored = storage.get_grade(course.id, student.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GradeStatus::Passing);
    assert_eq!(stored.current_grade, Some(90.0));
    assert_eq!(stored.items.len(), 1);
    assert_eq!(storage.list_course_grades(course.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_forum_ordering_and_cascade() {
    let storage = setup().await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let course = create_course(&storage, "CS101", teacher.id).await;

    let pinned = storage
        .create_post(
            course.id,
            teacher.id,
            CreatePostRequest {
                title: "Syllabus".to_string(),
                content: "Read me first".to_string(),
            },
        )
        .await
        .unwrap();
    let newer = storage
        .create_post(
            course.id,
            teacher.id,
            CreatePostRequest {
                title: "Week 2".to_string(),
                content: "Homework discussion".to_string(),
            },
        )
        .await
        .unwrap();
    storage
        .update_post(
            pinned.id,
            UpdatePostRequest {
                is_pinned: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let page = storage
        .list_posts_with_pagination(
            course.id,
            PostListQuery {
                page: 1,
                size: 20,
                search: None,
            },
        )
        .await
        .unwrap();
    let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![pinned.id, newer.id]);

    let searched = storage
        .list_posts_with_pagination(
            course.id,
            PostListQuery {
                page: 1,
                size: 20,
                search: Some("Homework".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(searched.pagination.total, 1);

    let root = storage
        .create_comment(
            newer.id,
            teacher.id,
            CreateCommentRequest {
                content: "first".to_string(),
                parent_comment_id: None,
            },
        )
        .await
        .unwrap();
    storage
        .create_comment(
            newer.id,
            teacher.id,
            CreateCommentRequest {
                content: "reply".to_string(),
                parent_comment_id: Some(root.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(storage.count_comments(newer.id).await.unwrap(), 2);

    assert!(storage.delete_post(newer.id).await.unwrap());
    assert_eq!(storage.count_comments(newer.id).await.unwrap(), 0);
    assert!(storage.get_comment_by_id(root.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_notifications_unread_flow() {
    let storage = setup().await;
    let student = create_user(&storage, "student1", UserRole::Student).await;

    let notifications = (0..3)
        .map(|i| NewNotification {
            user_id: student.id,
            notification_type: NotificationType::AssignmentPublished,
            title: format!("Assignment {i}"),
            content: None,
            reference_type: None,
            reference_id: None,
        })
        .collect();
    assert_eq!(storage.create_notifications(notifications).await.unwrap(), 3);
    assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 3);

    let page = storage
        .list_notifications_with_pagination(
            student.id,
            NotificationListQuery {
                page: 1,
                size: 10,
                unread_only: true,
            },
        )
        .await
        .unwrap();
    assert!(storage.mark_notification_read(page.items[0].id).await.unwrap());
    assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 2);

    assert_eq!(storage.mark_all_notifications_read(student.id).await.unwrap(), 2);
    assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 0);
}
