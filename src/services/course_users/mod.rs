pub mod enroll;
pub mod members;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    course_users::requests::{CourseUserListParams, UpdateCourseUserRequest},
    courses::requests::EnrollRequest,
};
use crate::storage::Storage;

pub struct CourseUserService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseUserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    /// 凭选课密钥以学生身份加入
    pub async fn enroll(
        &self,
        course_id: i64,
        body: EnrollRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::enroll(self, course_id, body, request).await
    }

    pub async fn leave(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        enroll::leave(self, course_id, request).await
    }

    pub async fn list_members(
        &self,
        course_id: i64,
        params: CourseUserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::list_members(self, course_id, params, request).await
    }

    pub async fn update_member_role(
        &self,
        course_id: i64,
        user_id: i64,
        update: UpdateCourseUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::update_member_role(self, course_id, user_id, update, request).await
    }

    pub async fn remove_member(
        &self,
        course_id: i64,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::remove_member(self, course_id, user_id, request).await
    }
}
