use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::{
    ApiResponse,
    assignments::{
        requests::{AssignmentListParams, AssignmentListQuery},
        responses::AssignmentListItem,
    },
};
use crate::services::internal_error;
use crate::services::permissions::{current_user, resolve_course_access};
use crate::services::submissions::lifecycle::latest_per_student;

pub async fn list_assignments(
    service: &AssignmentService,
    course_id: i64,
    params: AssignmentListParams,
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
    let query = AssignmentListQuery {
        page,
        size,
        module_id: params.module_id,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };

    let result = match storage
        .list_assignments_with_pagination(course_id, query)
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(internal_error("Failed to list assignments", e)),
    };

    // 学生附带本人每个作业的最新提交
    let mine = if access.is_student() {
        let ids: Vec<i64> = result.items.iter().map(|a| a.id).collect();
        match storage
            .list_submissions_by_assignments(&ids, Some(user.id))
            .await
        {
            Ok(submissions) => submissions,
            Err(e) => return Ok(internal_error("Failed to list assignments", e)),
        }
    } else {
        Vec::new()
    };

    let result = result.map(|assignment| {
        let own: Vec<_> = mine
            .iter()
            .filter(|s| s.assignment_id == assignment.id)
            .cloned()
            .collect();
        let latest = latest_per_student(&own).remove(&user.id).cloned();
        AssignmentListItem {
            my_status: latest.as_ref().map(|s| s.status),
            my_grade: latest.as_ref().and_then(|s| s.grade),
            attempts_used: latest.map_or(0, |s| s.attempt_number),
            assignment,
        }
    });

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Success")))
}
