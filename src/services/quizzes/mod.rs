pub mod attempts;
pub mod crud;
pub mod evaluate;
pub mod grade;
pub mod stats;
pub mod timing;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::LmsError;
use crate::models::{
    ErrorCode,
    courses::entities::Course,
    quizzes::{
        entities::{AttemptStatus, Quiz, QuizAttempt},
        requests::{
            CreateQuizRequest, GradeAttemptRequest, QuizListParams, SaveAnswersRequest,
            SubmitAttemptRequest, UpdateQuizRequest,
        },
        responses::AttemptView,
    },
    users::entities::User,
};
use crate::services::gradebook::refresh_student_grade;
use crate::services::permissions::{CourseAccess, resolve_course_access};
use crate::services::{forbidden, internal_error, not_found};
use crate::storage::Storage;

pub struct QuizService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuizService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_quizzes(
        &self,
        course_id: i64,
        params: QuizListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::list_quizzes(self, course_id, params, request).await
    }

    pub async fn create_quiz(
        &self,
        course_id: i64,
        quiz: CreateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::create_quiz(self, course_id, quiz, request).await
    }

    // 学生看到的题目不含答案
    pub async fn get_quiz(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        crud::get_quiz(self, quiz_id, request).await
    }

    pub async fn update_quiz(
        &self,
        quiz_id: i64,
        update: UpdateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::update_quiz(self, quiz_id, update, request).await
    }

    pub async fn delete_quiz(
        &self,
        quiz_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::delete_quiz(self, quiz_id, request).await
    }

    /// 开始作答；已有进行中的作答时直接返回它
    pub async fn start_attempt(
        &self,
        quiz_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::start_attempt(self, quiz_id, request).await
    }

    pub async fn list_attempts(
        &self,
        quiz_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::list_attempts(self, quiz_id, request).await
    }

    pub async fn get_attempt(
        &self,
        attempt_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::get_attempt(self, attempt_id, request).await
    }

    pub async fn save_answers(
        &self,
        attempt_id: i64,
        body: SaveAnswersRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::save_answers(self, attempt_id, body, request).await
    }

    pub async fn submit_attempt(
        &self,
        attempt_id: i64,
        body: SubmitAttemptRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::submit_attempt(self, attempt_id, body, request).await
    }

    // 问答题人工评分
    pub async fn grade_attempt(
        &self,
        attempt_id: i64,
        body: GradeAttemptRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_attempt(self, attempt_id, body, request).await
    }

    pub async fn get_stats(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        stats::get_quiz_stats(self, quiz_id, request).await
    }
}

/// 加载测验并解析身份；学生访问未发布的测验按不存在处理
pub(crate) async fn load_quiz(
    storage: &Arc<dyn Storage>,
    user: &User,
    quiz_id: i64,
) -> Result<(Quiz, Course, CourseAccess), HttpResponse> {
    let quiz = match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Err(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Err(internal_error("Failed to load quiz", e)),
    };
    let (course, access) = resolve_course_access(storage, user, quiz.course_id).await?;
    if !access.is_staff() && !quiz.is_published {
        return Err(not_found(ErrorCode::QuizNotFound, "Quiz not found"));
    }
    Ok((quiz, course, access))
}

/// 加载作答；学生只能访问自己的作答
pub(crate) async fn load_attempt(
    storage: &Arc<dyn Storage>,
    user: &User,
    attempt_id: i64,
) -> Result<(QuizAttempt, Quiz, Course, CourseAccess), HttpResponse> {
    let attempt = match storage.get_attempt_by_id(attempt_id).await {
        Ok(Some(attempt)) => attempt,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::QuizAttemptNotFound,
                "Quiz attempt not found",
            ));
        }
        Err(e) => return Err(internal_error("Failed to load quiz attempt", e)),
    };
    let quiz = match storage.get_quiz_by_id(attempt.quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Err(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Err(internal_error("Failed to load quiz", e)),
    };
    let (course, access) = resolve_course_access(storage, user, quiz.course_id).await?;
    if !access.is_staff() && attempt.student_id != user.id {
        return Err(forbidden(
            ErrorCode::Forbidden,
            "You can only access your own attempts",
        ));
    }
    Ok((attempt, quiz, course, access))
}

/// 过期则按已保存答案交卷并写回；第二项表示本次是否交卷
async fn close_if_expired(
    storage: &Arc<dyn Storage>,
    passing_score: f64,
    attempt: QuizAttempt,
    now: DateTime<Utc>,
) -> Result<(QuizAttempt, bool), LmsError> {
    let grace = AppConfig::get().quiz.submit_grace_seconds;
    if !timing::is_expired(&attempt, now, grace) {
        return Ok((attempt, false));
    }

    let mut attempt = attempt;
    evaluate::finalize_attempt(&mut attempt, passing_score, true, now);
    let saved = storage.save_attempt(&attempt).await?;
    info!(
        "Attempt {} of quiz {} auto-submitted after time limit",
        saved.id, saved.quiz_id
    );
    Ok((saved, true))
}

/// 批量交卷过期作答，不重算成绩；返回处理后的作答与因此评分完成的学生
pub(crate) async fn close_expired_attempts(
    storage: &Arc<dyn Storage>,
    quizzes: &[Quiz],
    attempts: Vec<QuizAttempt>,
    now: DateTime<Utc>,
) -> Result<(Vec<QuizAttempt>, HashSet<i64>), LmsError> {
    let passing: HashMap<i64, f64> = quizzes.iter().map(|q| (q.id, q.passing_score)).collect();
    let mut graded_students = HashSet::new();
    let mut result = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        let Some(&passing_score) = passing.get(&attempt.quiz_id) else {
            result.push(attempt);
            continue;
        };
        let (attempt, closed) = close_if_expired(storage, passing_score, attempt, now).await?;
        if closed && attempt.status == AttemptStatus::Graded {
            graded_students.insert(attempt.student_id);
        }
        result.push(attempt);
    }
    Ok((result, graded_students))
}

/// 单个作答的过期处理，评分完成时重算该学生成绩
pub(crate) async fn finalize_if_expired(
    storage: &Arc<dyn Storage>,
    quiz: &Quiz,
    course: &Course,
    attempt: QuizAttempt,
    now: DateTime<Utc>,
) -> Result<QuizAttempt, LmsError> {
    let (attempt, closed) = close_if_expired(storage, quiz.passing_score, attempt, now).await?;
    if closed && attempt.status == AttemptStatus::Graded {
        refresh_student_grade(storage, course, attempt.student_id).await;
    }
    Ok(attempt)
}

/// 列表与统计读取前先交卷过期作答
pub(crate) async fn finalize_expired_in_list(
    storage: &Arc<dyn Storage>,
    quiz: &Quiz,
    course: &Course,
    attempts: Vec<QuizAttempt>,
    now: DateTime<Utc>,
) -> Result<Vec<QuizAttempt>, LmsError> {
    let (attempts, graded_students) =
        close_expired_attempts(storage, std::slice::from_ref(quiz), attempts, now).await?;
    for student_id in graded_students {
        refresh_student_grade(storage, course, student_id).await;
    }
    Ok(attempts)
}

/// 按公布规则生成作答视图
pub(crate) fn attempt_view(
    quiz: &Quiz,
    mut attempt: QuizAttempt,
    is_staff: bool,
    now: DateTime<Utc>,
) -> AttemptView {
    let answers_visible = timing::answers_visible(quiz, &attempt, is_staff, now);
    if !answers_visible {
        attempt.questions_snapshot = attempt
            .questions_snapshot
            .iter()
            .map(|q| q.redacted())
            .collect();
        for answer in &mut attempt.answers {
            answer.is_correct = None;
        }
    }
    AttemptView {
        remaining_seconds: timing::remaining_seconds(&attempt, now),
        answers_visible,
        attempt,
    }
}
