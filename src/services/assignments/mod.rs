pub mod crud;
pub mod list;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListParams, CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    courses::entities::Course,
    users::entities::User,
};
use crate::services::permissions::{CourseAccess, resolve_course_access};
use crate::services::{internal_error, not_found};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_assignments(
        &self,
        course_id: i64,
        params: AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, course_id, params, request).await
    }

    pub async fn create_assignment(
        &self,
        course_id: i64,
        assignment: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::create_assignment(self, course_id, assignment, request).await
    }

    pub async fn get_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::get_assignment(self, assignment_id, request).await
    }

    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::update_assignment(self, assignment_id, update, request).await
    }

    pub async fn delete_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::delete_assignment(self, assignment_id, request).await
    }

    pub async fn get_stats(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        stats::get_assignment_stats(self, assignment_id, request).await
    }
}

/// 加载作业并解析调用者在所属课程中的身份
pub(crate) async fn load_assignment(
    storage: &Arc<dyn Storage>,
    user: &User,
    assignment_id: i64,
) -> Result<(Assignment, Course, CourseAccess), HttpResponse> {
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            ));
        }
        Err(e) => return Err(internal_error("Failed to load assignment", e)),
    };
    let (course, access) = resolve_course_access(storage, user, assignment.course_id).await?;
    Ok((assignment, course, access))
}
