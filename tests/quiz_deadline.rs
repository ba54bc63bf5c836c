//! 测验作答的时限与快照：过期作答在各读取路径上自动交卷，判分只看快照

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, http::StatusCode, test, web};
use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, Database};
use serde_json::json;

use lms_server::models::course_users::entities::CourseRole;
use lms_server::models::courses::entities::{Course, GradingScheme};
use lms_server::models::courses::requests::NewCourse;
use lms_server::models::gradebook::entities::{GradeItemSource, GradeStatus};
use lms_server::models::quizzes::entities::{
    AttemptAnswer, AttemptStatus, Question, QuestionType, Quiz, QuizAttempt, ShowAnswersAfter,
};
use lms_server::models::quizzes::requests::{
    CreateQuizRequest, GradeAnswerEntry, GradeAttemptRequest, NewQuizAttempt,
    SubmitAttemptRequest, UpdateQuizRequest,
};
use lms_server::models::users::entities::{User, UserRole, UserStatus};
use lms_server::models::users::requests::NewUser;
use lms_server::services::gradebook::recalculate::{recalculate_course, recalculate_student};
use lms_server::services::quizzes::QuizService;
use lms_server::storage::{SeaOrmStorage, Storage};

struct Fixture {
    storage: Arc<dyn Storage>,
    teacher: User,
    course: Course,
}

async fn setup() -> Fixture {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::from_connection(db).await.unwrap());

    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let course = storage
        .create_course(NewCourse {
            code: "CS101".to_string(),
            name: "Systems".to_string(),
            description: None,
            credits: 3,
            instructor_id: teacher.id,
            major_id: None,
            enrollment_key: "KEYCS101".to_string(),
            grading_scheme: GradingScheme::default(),
        })
        .await
        .unwrap();

    Fixture {
        storage,
        teacher,
        course,
    }
}

async fn create_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
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

async fn enroll(fx: &Fixture, username: &str) -> User {
    let student = create_user(&fx.storage, username, UserRole::Student).await;
    fx.storage
        .add_course_user(fx.course.id, student.id, CourseRole::Student)
        .await
        .unwrap();
    student
}

fn true_false(points: f64) -> Question {
    Question {
        id: "q1".to_string(),
        question_type: QuestionType::TrueFalse,
        text: "Rust has a borrow checker".to_string(),
        options: vec![],
        correct_answer: Some("true".to_string()),
        accepted_answers: vec![],
        case_sensitive: false,
        points,
    }
}

fn essay() -> Question {
    Question {
        id: "q2".to_string(),
        question_type: QuestionType::Essay,
        text: "Explain ownership".to_string(),
        options: vec![],
        correct_answer: None,
        accepted_answers: vec![],
        case_sensitive: false,
        points: 8.0,
    }
}

async fn create_quiz(fx: &Fixture, questions: Vec<Question>) -> Quiz {
    fx.storage
        .create_quiz(
            fx.course.id,
            fx.teacher.id,
            CreateQuizRequest {
                module_id: None,
                title: "Timed quiz".to_string(),
                description: None,
                questions,
                time_limit_minutes: Some(10),
                max_attempts: None,
                passing_score: 60.0,
                show_answers_after: ShowAnswersAfter::Immediately,
                available_from: None,
                due_date: None,
                is_published: true,
                category: None,
            },
        )
        .await
        .unwrap()
}

/// 两小时前开始、限时 10 分钟的作答，答案已保存但没有交卷
async fn expired_attempt(fx: &Fixture, quiz: &Quiz, student: &User) -> QuizAttempt {
    let started = Utc::now() - Duration::hours(2);
    let mut attempt = fx
        .storage
        .create_attempt(NewQuizAttempt {
            quiz_id: quiz.id,
            student_id: student.id,
            attempt_number: 1,
            questions_snapshot: quiz.questions.clone(),
            total_points: quiz.total_points(),
            started_at: started,
            deadline_at: Some(started + Duration::minutes(10)),
        })
        .await
        .unwrap();

    attempt.answers = quiz
        .questions
        .iter()
        .map(|q| AttemptAnswer {
            question_id: q.id.clone(),
            answer: Some(match q.question_type {
                QuestionType::TrueFalse => "true".to_string(),
                _ => "Moves and borrows".to_string(),
            }),
            is_correct: None,
            points_awarded: None,
            feedback: None,
        })
        .collect();
    fx.storage.save_attempt(&attempt).await.unwrap()
}

fn request_as(storage: &Arc<dyn Storage>, user: &User) -> HttpRequest {
    let req = test::TestRequest::default()
        .app_data(web::Data::new(storage.clone()))
        .to_http_request();
    req.extensions_mut().insert(user.clone());
    req
}

async fn reload(storage: &Arc<dyn Storage>, id: i64) -> QuizAttempt {
    storage.get_attempt_by_id(id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_recalculate_student_submits_expired_attempt() {
    let fx = setup().await;
    let student = enroll(&fx, "student1").await;
    let quiz = create_quiz(&fx, vec![true_false(10.0)]).await;
    let attempt = expired_attempt(&fx, &quiz, &student).await;

    let grade = recalculate_student(&fx.storage, &fx.course, student.id)
        .await
        .unwrap();

    let stored = reload(&fx.storage, attempt.id).await;
    assert_eq!(stored.status, AttemptStatus::Graded);
    assert!(stored.auto_submitted);
    assert_eq!(stored.score, Some(10.0));

    let item = grade
        .items
        .iter()
        .find(|i| i.source == GradeItemSource::Quiz && i.source_id == quiz.id)
        .unwrap();
    assert_eq!(item.earned, Some(10.0));
    assert_ne!(grade.status, GradeStatus::Incomplete);
}

#[tokio::test]
async fn test_recalculate_course_submits_expired_attempts() {
    let fx = setup().await;
    let s1 = enroll(&fx, "student1").await;
    let s2 = enroll(&fx, "student2").await;
    let quiz = create_quiz(&fx, vec![true_false(10.0)]).await;
    let a1 = expired_attempt(&fx, &quiz, &s1).await;
    let a2 = expired_attempt(&fx, &quiz, &s2).await;

    let (succeeded, failed) = recalculate_course(&fx.storage, &fx.course).await.unwrap();
    assert_eq!((succeeded, failed), (2, 0));

    for (attempt, student) in [(a1, &s1), (a2, &s2)] {
        assert_eq!(reload(&fx.storage, attempt.id).await.status, AttemptStatus::Graded);
        let grade = fx
            .storage
            .get_grade(fx.course.id, student.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grade.current_grade, Some(100.0));
    }
}

#[tokio::test]
async fn test_attempt_list_submits_expired_attempt() {
    let fx = setup().await;
    let student = enroll(&fx, "student1").await;
    let quiz = create_quiz(&fx, vec![true_false(10.0)]).await;
    let attempt = expired_attempt(&fx, &quiz, &student).await;

    let resp = QuizService::new_lazy()
        .list_attempts(quiz.id, &request_as(&fx.storage, &student))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = reload(&fx.storage, attempt.id).await;
    assert_eq!(stored.status, AttemptStatus::Graded);
    assert!(stored.submitted_at.is_some());

    // 自动交卷后成绩册同步更新
    let grade = fx
        .storage
        .get_grade(fx.course.id, student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grade.current_grade, Some(100.0));
}

#[tokio::test]
async fn test_quiz_stats_count_expired_attempt_as_finished() {
    let fx = setup().await;
    let student = enroll(&fx, "student1").await;
    let quiz = create_quiz(&fx, vec![true_false(10.0)]).await;
    let attempt = expired_attempt(&fx, &quiz, &student).await;

    let resp = QuizService::new_lazy()
        .get_stats(quiz.id, &request_as(&fx.storage, &fx.teacher))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["finished_attempts"], json!(1));
    assert_eq!(body["data"]["graded_attempts"], json!(1));
    assert_eq!(reload(&fx.storage, attempt.id).await.status, AttemptStatus::Graded);
}

#[tokio::test]
async fn test_manual_grading_accepts_expired_attempt() {
    let fx = setup().await;
    let student = enroll(&fx, "student1").await;
    let quiz = create_quiz(&fx, vec![true_false(10.0), essay()]).await;
    let attempt = expired_attempt(&fx, &quiz, &student).await;

    let resp = QuizService::new_lazy()
        .grade_attempt(
            attempt.id,
            GradeAttemptRequest {
                grades: vec![GradeAnswerEntry {
                    question_id: "q2".to_string(),
                    points: 6.0,
                    feedback: None,
                }],
            },
            &request_as(&fx.storage, &fx.teacher),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = reload(&fx.storage, attempt.id).await;
    assert_eq!(stored.status, AttemptStatus::Graded);
    assert!(stored.auto_submitted);
    assert_eq!(stored.score, Some(16.0));
}

#[tokio::test]
async fn test_quiz_edit_does_not_change_started_attempt() {
    let fx = setup().await;
    let student = enroll(&fx, "student1").await;
    let quiz = create_quiz(&fx, vec![true_false(10.0)]).await;
    let service = QuizService::new_lazy();
    let as_student = request_as(&fx.storage, &student);

    let resp = service.start_attempt(quiz.id, &as_student).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let attempt = fx
        .storage
        .get_in_progress_attempt(quiz.id, student.id)
        .await
        .unwrap()
        .unwrap();

    // 作答开始后修改答案与分值
    let edited = Question {
        correct_answer: Some("false".to_string()),
        points: 1.0,
        ..true_false(10.0)
    };
    let live = fx
        .storage
        .update_quiz(
            quiz.id,
            UpdateQuizRequest {
                questions: Some(vec![edited]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.questions[0].correct_answer.as_deref(), Some("false"));

    let resp = service
        .submit_attempt(
            attempt.id,
            SubmitAttemptRequest {
                answers: Some(HashMap::from([("q1".to_string(), json!(true))])),
            },
            &as_student,
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = reload(&fx.storage, attempt.id).await;
    assert_eq!(stored.status, AttemptStatus::Graded);
    assert_eq!(stored.questions_snapshot[0].correct_answer.as_deref(), Some("true"));
    assert_eq!(stored.questions_snapshot[0].points, 10.0);
    assert_eq!(stored.answers[0].is_correct, Some(true));
    assert_eq!(stored.score, Some(10.0));
    assert_eq!(stored.percentage, Some(100.0));
    assert_eq!(stored.passed, Some(true));
}
