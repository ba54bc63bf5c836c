use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 固定窗口计数器：键为 `前缀:身份`，值为 (窗口开始时间, 计数)
static RATE_LIMIT_CACHE: Lazy<Cache<String, (Instant, u32)>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            key_prefix,
        }
    }

    /// 登录：每 IP 每分钟 5 次
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 注册：每 IP 每分钟 3 次
    pub fn register() -> Self {
        Self::new("register", 3, 60)
    }

    /// 选课密钥查询与选课：每用户每分钟 10 次
    pub fn enrollment_key() -> Self {
        Self::new("enrollment_key", 10, 60)
    }
}

/// 计算新的窗口状态；超限时返回 Err(剩余等待秒数)
fn advance_window(
    entry: Option<(Instant, u32)>,
    now: Instant,
    max_requests: u32,
    window: Duration,
) -> Result<(Instant, u32), u64> {
    match entry {
        Some((start, count)) if now.duration_since(start) < window => {
            if count >= max_requests {
                let retry = window.saturating_sub(now.duration_since(start));
                Err(retry.as_secs().max(1))
            } else {
                Ok((start, count + 1))
            }
        }
        _ => Ok((now, 1)),
    }
}

/// 客户端标识：已登录用户按 ID，否则按 IP
fn client_identity(req: &ServiceRequest) -> String {
    if let Some(user_id) = req.extensions().get::<User>().map(|u| u.id) {
        return format!("user:{user_id}");
    }

    let ip = req
        .connection_info()
        .realip_remote_addr()
        .and_then(|addr| {
            addr.parse::<std::net::IpAddr>()
                .ok()
                .or_else(|| addr.parse::<std::net::SocketAddr>().ok().map(|s| s.ip()))
        })
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("ip:{ip}")
}

fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let cache_key = format!("{}:{}", limit.key_prefix, client_identity(&req));
            let entry = RATE_LIMIT_CACHE.get(&cache_key).await;

            match advance_window(entry, Instant::now(), limit.max_requests, limit.window) {
                Ok(next) => {
                    RATE_LIMIT_CACHE.insert(cache_key, next).await;
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(retry_after) => {
                    warn!("Rate limit exceeded for {}", cache_key);
                    Ok(req.into_response(
                        create_rate_limit_response(retry_after).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window, Duration::from_secs(60));
        assert_eq!(RateLimit::register().key_prefix, "register");
        assert_eq!(RateLimit::enrollment_key().max_requests, 10);
    }

    #[test]
    fn test_window_counts_up_to_limit() {
        let window = Duration::from_secs(60);
        let start = Instant::now();
        let mut entry = None;
        for _ in 0..3 {
            entry = Some(advance_window(entry, start, 3, window).unwrap());
        }
        assert_eq!(entry.map(|e| e.1), Some(3));
        assert!(advance_window(entry, start + Duration::from_secs(10), 3, window).is_err());
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let window = Duration::from_secs(60);
        let start = Instant::now();
        let full = Some((start, 3));
        let later = start + Duration::from_secs(61);
        assert_eq!(advance_window(full, later, 3, window), Ok((later, 1)));
    }
}
