use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::evaluate::{validate_questions, validate_settings};
use super::{QuizService, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::entities::Course,
    notifications::entities::{NotificationType, ReferenceType},
    quizzes::{
        entities::Quiz,
        requests::{CreateQuizRequest, QuizListParams, QuizListQuery, UpdateQuizRequest},
        responses::QuizListItem,
    },
};
use crate::services::gradebook::refresh_course_grades;
use crate::services::modules::ensure_module_in_course;
use crate::services::notifications::dispatch::notify_course_students;
use crate::services::permissions::{
    current_user, ensure_course_active, require_course_staff, resolve_course_access,
};
use crate::services::{bad_request, forbidden, internal_error, not_found};
use crate::storage::Storage;
use crate::utils::validate::validate_required_text;

async fn announce(storage: &Arc<dyn Storage>, course: &Course, quiz: &Quiz) {
    notify_course_students(
        storage,
        course.id,
        NotificationType::QuizPublished,
        format!("New quiz in {}: {}", course.name, quiz.title),
        (ReferenceType::Quiz, quiz.id),
    )
    .await;
}

pub async fn list_quizzes(
    service: &QuizService,
    course_id: i64,
    params: QuizListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (_, access) = match resolve_course_access(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let (page, size) = params.pagination.normalized();
    let query = QuizListQuery {
        page,
        size,
        module_id: params.module_id,
        published_only: !access.is_staff(),
    };
    let result = match storage.list_quizzes_with_pagination(course_id, query).await {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list quizzes", e)),
    };

    // 学生附带已用次数
    let used: Option<HashMap<i64, i32>> = if access.is_student() {
        let ids: Vec<i64> = result.items.iter().map(|q| q.id).collect();
        match storage.list_attempts_by_quizzes(&ids, Some(user.id)).await {
            Ok(attempts) => {
                let mut used = HashMap::new();
                for attempt in attempts {
                    let entry = used.entry(attempt.quiz_id).or_insert(0);
                    *entry = (*entry).max(attempt.attempt_number);
                }
                Some(used)
            }
            Err(e) => return Ok(internal_error("Failed to list quizzes", e)),
        }
    } else {
        None
    };

    let result = result.map(|quiz| {
        let attempts_used = used
            .as_ref()
            .map(|u| u.get(&quiz.id).copied().unwrap_or(0));
        QuizListItem::from_quiz(&quiz, attempts_used)
    });
    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Success")))
}

pub async fn create_quiz(
    service: &QuizService,
    course_id: i64,
    mut quiz: CreateQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_required_text("title", &quiz.title, 200) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) = validate_questions(&quiz.questions) {
        return Ok(bad_request(ErrorCode::QuizInvalid, msg));
    }
    if let Err(msg) = validate_settings(
        Some(quiz.passing_score),
        quiz.time_limit_minutes,
        quiz.max_attempts,
        quiz.available_from,
        quiz.due_date,
    ) {
        return Ok(bad_request(ErrorCode::QuizInvalid, msg));
    }
    quiz.title = quiz.title.trim().to_string();

    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }
    if let Some(module_id) = quiz.module_id
        && let Err(resp) = ensure_module_in_course(&storage, course_id, module_id).await
    {
        return Ok(resp);
    }

    let created = match storage.create_quiz(course_id, user.id, quiz).await {
        Ok(quiz) => quiz,
        Err(e) => return Ok(internal_error("Failed to create quiz", e)),
    };
    info!(
        "Quiz {} created in course {} by user {}",
        created.id, course_id, user.id
    );

    if created.is_published {
        announce(&storage, &course, &created).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(created, "Quiz created")))
}

pub async fn get_quiz(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match load_quiz(&storage, &user, quiz_id).await {
        Ok((quiz, _, access)) => {
            let quiz = if access.is_staff() {
                quiz
            } else {
                quiz.redacted()
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(quiz, "Success")))
        }
        Err(resp) => Ok(resp),
    }
}

pub async fn update_quiz(
    service: &QuizService,
    quiz_id: i64,
    mut update: UpdateQuizRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Some(title) = &update.title {
        if let Err(msg) = validate_required_text("title", title, 200) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        update.title = Some(title.trim().to_string());
    }
    if let Some(questions) = &update.questions
        && let Err(msg) = validate_questions(questions)
    {
        return Ok(bad_request(ErrorCode::QuizInvalid, msg));
    }

    let storage = service.get_storage(request)?;
    let (quiz, course, access) = match load_quiz(&storage, &user, quiz_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ));
    }

    // 与现有值合并后再检查时间窗口
    if let Err(msg) = validate_settings(
        update.passing_score,
        update.time_limit_minutes,
        update.max_attempts,
        update.available_from.or(quiz.available_from),
        update.due_date.or(quiz.due_date),
    ) {
        return Ok(bad_request(ErrorCode::QuizInvalid, msg));
    }
    if let Some(module_id) = update.module_id
        && let Err(resp) = ensure_module_in_course(&storage, course.id, module_id).await
    {
        return Ok(resp);
    }

    let newly_published = update.is_published == Some(true) && !quiz.is_published;
    let affects_grades = update.questions.is_some()
        || update.category.is_some_and(|c| c != quiz.category)
        || update.is_published.is_some_and(|p| p != quiz.is_published);

    match storage.update_quiz(quiz_id, update).await {
        Ok(Some(updated)) => {
            if newly_published {
                announce(&storage, &course, &updated).await;
            }
            if affects_grades {
                refresh_course_grades(&storage, &course).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Quiz updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Ok(internal_error("Failed to update quiz", e)),
    }
}

pub async fn delete_quiz(
    service: &QuizService,
    quiz_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (_, course, access) = match load_quiz(&storage, &user, quiz_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ));
    }

    match storage.delete_quiz(quiz_id).await {
        Ok(true) => {
            info!("Quiz {} deleted by user {}", quiz_id, user.id);
            refresh_course_grades(&storage, &course).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Quiz deleted")))
        }
        Ok(false) => Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Ok(internal_error("Failed to delete quiz", e)),
    }
}
