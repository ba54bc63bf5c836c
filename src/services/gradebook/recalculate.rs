use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use super::GradebookService;
use super::calculator::calculate;
use super::collect::collect_items;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::entities::Assignment,
    course_users::entities::CourseRole,
    courses::entities::Course,
    gradebook::{
        entities::{Grade, ManualGrade},
        requests::GradeRecord,
        responses::RecalculateResponse,
    },
    quizzes::entities::{Quiz, QuizAttempt},
    submissions::entities::Submission,
};
use crate::services::permissions::{current_user, require_course_staff};
use crate::services::quizzes::close_expired_attempts;
use crate::services::{internal_error, not_found};
use crate::storage::Storage;

/// 课程内全部作业、测验的基础数据
struct CourseSources {
    assignments: Vec<Assignment>,
    quizzes: Vec<Quiz>,
}

async fn load_sources(storage: &Arc<dyn Storage>, course_id: i64) -> Result<CourseSources> {
    Ok(CourseSources {
        assignments: storage.list_course_assignments(course_id).await?,
        quizzes: storage.list_course_quizzes(course_id).await?,
    })
}

fn build_record(
    course: &Course,
    student_id: i64,
    sources: &CourseSources,
    submissions: &[Submission],
    attempts: &[QuizAttempt],
    manual: &[ManualGrade],
) -> GradeRecord {
    let items = collect_items(
        &sources.assignments,
        submissions,
        &sources.quizzes,
        attempts,
        manual,
    );
    let summary = calculate(&items, &course.grading_scheme);

    GradeRecord {
        course_id: course.id,
        student_id,
        items,
        total_earned: summary.total_earned,
        total_possible: summary.total_possible,
        current_grade: summary.current_grade,
        letter_grade: summary.letter_grade,
        status: summary.status,
        calculated_at: Utc::now(),
    }
}

/// 全量重算单个学生的成绩并覆盖写入
pub async fn recalculate_student(
    storage: &Arc<dyn Storage>,
    course: &Course,
    student_id: i64,
) -> Result<Grade> {
    let sources = load_sources(storage, course.id).await?;
    let assignment_ids: Vec<i64> = sources.assignments.iter().map(|a| a.id).collect();
    let quiz_ids: Vec<i64> = sources.quizzes.iter().map(|q| q.id).collect();

    let submissions = storage
        .list_submissions_by_assignments(&assignment_ids, Some(student_id))
        .await?;
    let attempts = storage
        .list_attempts_by_quizzes(&quiz_ids, Some(student_id))
        .await?;
    let (attempts, _) =
        close_expired_attempts(storage, &sources.quizzes, attempts, Utc::now()).await?;
    let manual = storage
        .list_manual_grades(course.id, Some(student_id))
        .await?;

    let record = build_record(course, student_id, &sources, &submissions, &attempts, &manual);
    storage.upsert_grade(record).await
}

/// 重算课程内全部学生，返回 (成功数, 失败数)
pub async fn recalculate_course(
    storage: &Arc<dyn Storage>,
    course: &Course,
) -> Result<(usize, usize)> {
    let students = storage.list_course_students(course.id).await?;
    let sources = load_sources(storage, course.id).await?;
    let assignment_ids: Vec<i64> = sources.assignments.iter().map(|a| a.id).collect();
    let quiz_ids: Vec<i64> = sources.quizzes.iter().map(|q| q.id).collect();

    // 一次取出，按学生分组
    let mut submissions: HashMap<i64, Vec<Submission>> = HashMap::new();
    for s in storage
        .list_submissions_by_assignments(&assignment_ids, None)
        .await?
    {
        submissions.entry(s.student_id).or_default().push(s);
    }
    let all_attempts = storage.list_attempts_by_quizzes(&quiz_ids, None).await?;
    let (all_attempts, _) =
        close_expired_attempts(storage, &sources.quizzes, all_attempts, Utc::now()).await?;
    let mut attempts: HashMap<i64, Vec<QuizAttempt>> = HashMap::new();
    for a in all_attempts {
        attempts.entry(a.student_id).or_default().push(a);
    }
    let mut manual: HashMap<i64, Vec<_>> = HashMap::new();
    for m in storage.list_manual_grades(course.id, None).await? {
        manual.entry(m.student_id).or_default().push(m);
    }

    let mut succeeded = 0;
    let mut failed = 0;
    for student in students {
        let record = build_record(
            course,
            student.user_id,
            &sources,
            submissions.get(&student.user_id).map(Vec::as_slice).unwrap_or(&[]),
            attempts.get(&student.user_id).map(Vec::as_slice).unwrap_or(&[]),
            manual.get(&student.user_id).map(Vec::as_slice).unwrap_or(&[]),
        );
        match storage.upsert_grade(record).await {
            Ok(_) => succeeded += 1,
            Err(e) => {
                warn!(
                    "Failed to store grade of student {} in course {}: {}",
                    student.user_id, course.id, e
                );
                failed += 1;
            }
        }
    }

    Ok((succeeded, failed))
}

/// 交卷课程内已过期的作答并重算因此评分完成的学生，返回这些学生
pub(crate) async fn settle_expired_attempts(
    storage: &Arc<dyn Storage>,
    course: &Course,
    student_id: Option<i64>,
) -> Result<HashSet<i64>> {
    let quizzes = storage.list_course_quizzes(course.id).await?;
    let quiz_ids: Vec<i64> = quizzes.iter().map(|q| q.id).collect();
    let attempts = storage
        .list_attempts_by_quizzes(&quiz_ids, student_id)
        .await?;
    if !attempts.iter().any(QuizAttempt::is_in_progress) {
        return Ok(HashSet::new());
    }

    let (_, graded_students) = close_expired_attempts(storage, &quizzes, attempts, Utc::now()).await?;
    for &id in &graded_students {
        recalculate_student(storage, course, id).await?;
    }
    Ok(graded_students)
}

/// 成绩变动后的附带重算，失败只记录警告
pub(crate) async fn refresh_student_grade(
    storage: &Arc<dyn Storage>,
    course: &Course,
    student_id: i64,
) {
    if let Err(e) = recalculate_student(storage, course, student_id).await {
        warn!(
            "Failed to recalculate grade of student {} in course {}: {}",
            student_id, course.id, e
        );
    }
}

pub(crate) async fn refresh_course_grades(storage: &Arc<dyn Storage>, course: &Course) {
    if let Err(e) = recalculate_course(storage, course).await {
        warn!("Failed to recalculate grades of course {}: {}", course.id, e);
    }
}

/// 目标用户必须是课程学生
pub(crate) async fn ensure_course_student(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    student_id: i64,
) -> std::result::Result<(), HttpResponse> {
    match storage.get_course_user(course_id, student_id).await {
        Ok(Some(m)) if m.role == CourseRole::Student => Ok(()),
        Ok(_) => Err(not_found(
            ErrorCode::CourseUserNotFound,
            "Student is not enrolled in this course",
        )),
        Err(e) => Err(internal_error("Failed to load course membership", e)),
    }
}

pub async fn recalculate_course_grades(
    service: &GradebookService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    match recalculate_course(&storage, &course).await {
        Ok((recalculated, failed)) => {
            info!(
                "Recalculated course {} gradebook: {} ok, {} failed",
                course.id, recalculated, failed
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RecalculateResponse {
                    course_id: course.id,
                    recalculated,
                    failed,
                },
                "Gradebook recalculated",
            )))
        }
        Err(e) => Ok(internal_error("Failed to recalculate gradebook", e)),
    }
}

pub async fn recalculate_student_grade(
    service: &GradebookService,
    course_id: i64,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_student(&storage, course_id, student_id).await {
        return Ok(resp);
    }

    match recalculate_student(&storage, &course, student_id).await {
        Ok(grade) => Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Grade recalculated"))),
        Err(e) => Ok(internal_error("Failed to recalculate grade", e)),
    }
}

