pub mod grade;
pub mod lifecycle;
pub mod list;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::submissions::requests::{
    CreateSubmissionRequest, GradeSubmissionRequest, ReturnSubmissionRequest, SubmissionListParams,
};
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 学生提交作业
    pub async fn submit(
        &self,
        assignment_id: i64,
        body: CreateSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit(self, assignment_id, body, request).await
    }

    pub async fn list_my_submissions(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_my_submissions(self, assignment_id, request).await
    }

    // 教学人员查看全部提交
    pub async fn list_submissions(
        &self,
        assignment_id: i64,
        params: SubmissionListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, assignment_id, params, request).await
    }

    pub async fn get_submission(
        &self,
        submission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::get_submission(self, submission_id, request).await
    }

    pub async fn grade_submission(
        &self,
        submission_id: i64,
        body: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, submission_id, body, request).await
    }

    // 退回重做
    pub async fn return_submission(
        &self,
        submission_id: i64,
        body: ReturnSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::return_submission(self, submission_id, body, request).await
    }
}
