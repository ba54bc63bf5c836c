pub mod calculator;
pub mod collect;
pub mod manual;
pub mod recalculate;
pub mod stats;
pub mod view;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::gradebook::requests::CreateManualGradeRequest;
use crate::storage::Storage;

pub use manual::ManualGradeListParams;
pub(crate) use recalculate::{refresh_course_grades, refresh_student_grade};

pub struct GradebookService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradebookService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 课程成绩册（教学人员）
    pub async fn get_gradebook(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        view::get_gradebook(self, course_id, request).await
    }

    pub async fn get_student_grade(
        &self,
        course_id: i64,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        view::get_student_grade(self, course_id, student_id, request).await
    }

    // 学生查看本人成绩
    pub async fn get_my_grade(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        view::get_my_grade(self, course_id, request).await
    }

    pub async fn recalculate_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        recalculate::recalculate_course_grades(self, course_id, request).await
    }

    pub async fn recalculate_student(
        &self,
        course_id: i64,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        recalculate::recalculate_student_grade(self, course_id, student_id, request).await
    }

    pub async fn get_stats(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        stats::get_gradebook_stats(self, course_id, request).await
    }

    // 手动成绩
    pub async fn list_manual_grades(
        &self,
        course_id: i64,
        params: ManualGradeListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manual::list_manual_grades(self, course_id, params, request).await
    }

    pub async fn create_manual_grade(
        &self,
        course_id: i64,
        entry: CreateManualGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manual::create_manual_grade(self, course_id, entry, request).await
    }

    pub async fn delete_manual_grade(
        &self,
        course_id: i64,
        entry_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manual::delete_manual_grade(self, course_id, entry_id, request).await
    }
}
