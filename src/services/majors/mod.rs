pub mod curriculums;
pub mod majors;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::majors::requests::{
    CreateCurriculumRequest, CreateMajorRequest, UpdateCurriculumRequest, UpdateMajorRequest,
};
use crate::storage::Storage;

pub struct MajorService {
    storage: Option<Arc<dyn Storage>>,
}

impl MajorService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_majors(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        majors::list_majors(self, request).await
    }

    pub async fn get_major(&self, major_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        majors::get_major(self, major_id, request).await
    }

    pub async fn create_major(
        &self,
        major: CreateMajorRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        majors::create_major(self, major, request).await
    }

    pub async fn update_major(
        &self,
        major_id: i64,
        update: UpdateMajorRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        majors::update_major(self, major_id, update, request).await
    }

    pub async fn delete_major(
        &self,
        major_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        majors::delete_major(self, major_id, request).await
    }

    // 培养方案
    pub async fn list_curriculums(
        &self,
        major_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        curriculums::list_curriculums(self, major_id, request).await
    }

    pub async fn get_curriculum(
        &self,
        curriculum_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        curriculums::get_curriculum(self, curriculum_id, request).await
    }

    pub async fn create_curriculum(
        &self,
        major_id: i64,
        curriculum: CreateCurriculumRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        curriculums::create_curriculum(self, major_id, curriculum, request).await
    }

    pub async fn update_curriculum(
        &self,
        curriculum_id: i64,
        update: UpdateCurriculumRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        curriculums::update_curriculum(self, curriculum_id, update, request).await
    }

    pub async fn delete_curriculum(
        &self,
        curriculum_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        curriculums::delete_curriculum(self, curriculum_id, request).await
    }
}
