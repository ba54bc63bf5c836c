use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::ModuleService;
use crate::models::{
    ApiResponse, ErrorCode,
    modules::{
        entities::CourseModule,
        requests::{CreateModuleRequest, UpdateModuleRequest},
        responses::ModuleListResponse,
    },
    users::entities::User,
};
use crate::services::permissions::{
    CourseAccess, current_user, ensure_course_active, require_course_staff, resolve_course_access,
};
use crate::services::{bad_request, forbidden, internal_error, not_found};
use crate::storage::Storage;
use crate::utils::validate::validate_required_text;

fn validate_position(position: Option<i32>) -> Result<(), HttpResponse> {
    match position {
        Some(p) if p < 0 => Err(bad_request(
            ErrorCode::BadRequest,
            "position must not be negative",
        )),
        _ => Ok(()),
    }
}

/// 加载单元并解析调用者身份；学生访问未发布单元按不存在处理
async fn load_module(
    storage: &Arc<dyn Storage>,
    user: &User,
    module_id: i64,
) -> Result<(CourseModule, CourseAccess), HttpResponse> {
    let module = match storage.get_module_by_id(module_id).await {
        Ok(Some(module)) => module,
        Ok(None) => return Err(not_found(ErrorCode::ModuleNotFound, "Module not found")),
        Err(e) => return Err(internal_error("Failed to load module", e)),
    };
    let (_, access) = resolve_course_access(storage, user, module.course_id).await?;
    if !access.is_staff() && !module.is_published {
        return Err(not_found(ErrorCode::ModuleNotFound, "Module not found"));
    }
    Ok((module, access))
}

pub async fn list_modules(
    service: &ModuleService,
    course_id: i64,
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

    match storage.list_modules(course_id, !access.is_staff()).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ModuleListResponse { items },
            "Success",
        ))),
        Err(e) => Ok(internal_error("Failed to list modules", e)),
    }
}

pub async fn create_module(
    service: &ModuleService,
    course_id: i64,
    mut module: CreateModuleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(msg) = validate_required_text("title", &module.title, 200) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(resp) = validate_position(module.position) {
        return Ok(resp);
    }
    module.title = module.title.trim().to_string();

    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_course_active(&course) {
        return Ok(resp);
    }

    match storage.create_module(course_id, module).await {
        Ok(module) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(module, "Module created")))
        }
        Err(e) => Ok(internal_error("Failed to create module", e)),
    }
}

pub async fn get_module(
    service: &ModuleService,
    module_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match load_module(&storage, &user, module_id).await {
        Ok((module, _)) => Ok(HttpResponse::Ok().json(ApiResponse::success(module, "Success"))),
        Err(resp) => Ok(resp),
    }
}

pub async fn update_module(
    service: &ModuleService,
    module_id: i64,
    mut update: UpdateModuleRequest,
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
    if let Err(resp) = validate_position(update.position) {
        return Ok(resp);
    }

    let storage = service.get_storage(request)?;
    let (_, access) = match load_module(&storage, &user, module_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can perform this action",
        ));
    }

    match storage.update_module(module_id, update).await {
        Ok(Some(module)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(module, "Module updated")))
        }
        Ok(None) => Ok(not_found(ErrorCode::ModuleNotFound, "Module not found")),
        Err(e) => Ok(internal_error("Failed to update module", e)),
    }
}

pub async fn delete_module(
    service: &ModuleService,
    module_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let module = match storage.get_module_by_id(module_id).await {
        Ok(Some(module)) => module,
        Ok(None) => return Ok(not_found(ErrorCode::ModuleNotFound, "Module not found")),
        Err(e) => return Ok(internal_error("Failed to load module", e)),
    };
    if let Err(resp) = require_course_staff(&storage, &user, module.course_id).await {
        return Ok(resp);
    }

    match storage.delete_module(module_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Module deleted"))),
        Ok(false) => Ok(not_found(ErrorCode::ModuleNotFound, "Module not found")),
        Err(e) => Ok(internal_error("Failed to delete module", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_position() {
        assert!(validate_position(None).is_ok());
        assert!(validate_position(Some(0)).is_ok());
        assert!(validate_position(Some(-1)).is_err());
    }
}
