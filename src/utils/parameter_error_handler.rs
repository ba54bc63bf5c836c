//! 请求参数解析失败时的统一响应
//!
//! actix 默认返回纯文本错误，这里改为与业务接口一致的 `ApiResponse` 信封。

use actix_web::{
    HttpRequest, HttpResponse, error,
    error::{JsonPayloadError, PathError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message))
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> error::Error {
    debug!("Invalid JSON body for {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body is too large".to_string()
        }
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
        other => format!("Invalid request body: {other}"),
    };
    error::InternalError::from_response(err, bad_request(message)).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> error::Error {
    debug!("Invalid query string for {}: {}", req.path(), err);
    let message = format!("Invalid query parameters: {err}");
    error::InternalError::from_response(err, bad_request(message)).into()
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> error::Error {
    debug!("Invalid path parameter for {}: {}", req.path(), err);
    let message = format!("Invalid path parameter: {err}");
    error::InternalError::from_response(err, bad_request(message)).into()
}
