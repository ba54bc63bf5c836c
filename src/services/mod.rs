pub mod assignments;
pub mod auth;
pub mod course_users;
pub mod courses;
pub mod forum;
pub mod gradebook;
pub mod majors;
pub mod modules;
pub mod notifications;
pub mod permissions;
pub mod quizzes;
pub mod submissions;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use course_users::CourseUserService;
pub use courses::CourseService;
pub use forum::ForumService;
pub use gradebook::GradebookService;
pub use majors::MajorService;
pub use modules::ModuleService;
pub use notifications::NotificationService;
pub use quizzes::QuizService;
pub use submissions::SubmissionService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, users::entities::UserSummary};
use crate::storage::Storage;

/// 从 app data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|storage| storage.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage is not registered in app data");
            actix_web::error::ErrorInternalServerError("Storage unavailable")
        })
}

/// 记录存储错误并返回 500
pub(crate) fn internal_error(context: &str, err: LmsError) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("{context}: {}", err.message()),
    ))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn conflict(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, message))
}

/// 批量加载用户摘要，按 ID 索引
pub(crate) async fn load_user_summaries(
    storage: &Arc<dyn Storage>,
    ids: &[i64],
) -> Result<HashMap<i64, UserSummary>, LmsError> {
    let mut unique: Vec<i64> = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    let users = storage.get_users_by_ids(&unique).await?;
    Ok(users
        .iter()
        .map(|user| (user.id, UserSummary::from(user)))
        .collect())
}

/// 保留两位小数
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(83.3333), 83.33);
        assert_eq!(round2(66.666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
