pub mod crud;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    modules::requests::{CreateModuleRequest, UpdateModuleRequest},
};
use crate::services::{bad_request, internal_error};
use crate::storage::Storage;

pub struct ModuleService {
    storage: Option<Arc<dyn Storage>>,
}

impl ModuleService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_modules(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::list_modules(self, course_id, request).await
    }

    pub async fn create_module(
        &self,
        course_id: i64,
        module: CreateModuleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::create_module(self, course_id, module, request).await
    }

    pub async fn get_module(
        &self,
        module_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::get_module(self, module_id, request).await
    }

    pub async fn update_module(
        &self,
        module_id: i64,
        update: UpdateModuleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::update_module(self, module_id, update, request).await
    }

    pub async fn delete_module(
        &self,
        module_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        crud::delete_module(self, module_id, request).await
    }
}

/// 作业、测验引用的单元必须属于同一课程
pub(crate) async fn ensure_module_in_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    module_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_module_by_id(module_id).await {
        Ok(Some(module)) if module.course_id == course_id => Ok(()),
        Ok(_) => Err(bad_request(
            ErrorCode::ModuleNotFound,
            "Module does not belong to this course",
        )),
        Err(e) => Err(internal_error("Failed to load module", e)),
    }
}
