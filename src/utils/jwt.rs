use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_TOKEN_COOKIE: &str = "lms_refresh_token";

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    pub role: String,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// 用给定密钥签发 token
pub fn encode_token(
    secret: &str,
    user_id: i64,
    role: &str,
    token_type: TokenType,
    expiry: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        token_type,
        exp: (now + expiry).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 用给定密钥校验 token 并检查类型
pub fn decode_token(
    secret: &str,
    token: &str,
    expected: TokenType,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;

    if claims.token_type != expected {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}

/// 读取全局配置的 JWT 工具
pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static str {
        AppConfig::get().jwt.secret.as_str()
    }

    /// access token 有效期（秒）
    pub fn access_token_ttl_seconds() -> i64 {
        AppConfig::get().jwt.access_token_expiry * 60
    }

    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let minutes = AppConfig::get().jwt.access_token_expiry;
        encode_token(
            Self::secret(),
            user_id,
            role,
            TokenType::Access,
            chrono::Duration::minutes(minutes),
        )
    }

    /// 生成 refresh token；未指定有效期时使用配置的天数
    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
        expiry: Option<chrono::Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expiry = expiry.unwrap_or_else(|| {
            chrono::Duration::days(AppConfig::get().jwt.refresh_token_expiry)
        });
        encode_token(Self::secret(), user_id, role, TokenType::Refresh, expiry)
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        refresh_expiry: Option<chrono::Duration>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: Self::generate_access_token(user_id, role)?,
            refresh_token: Self::generate_refresh_token(user_id, role, refresh_expiry)?,
        })
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode_token(Self::secret(), token, TokenType::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode_token(Self::secret(), token, TokenType::Refresh)
    }

    /// 用 refresh token 换取新的 access token
    pub fn refresh_access_token(
        refresh_token: &str,
    ) -> Result<(i64, String), jsonwebtoken::errors::Error> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .user_id()
            .ok_or(jsonwebtoken::errors::ErrorKind::InvalidToken)?;
        let token = Self::generate_access_token(user_id, &claims.role)?;
        Ok((user_id, token))
    }

    /// "记住我" 时 refresh token 的有效期
    pub fn remember_me_expiry() -> chrono::Duration {
        chrono::Duration::days(AppConfig::get().jwt.refresh_token_remember_me_expiry)
    }

    pub fn create_refresh_token_cookie(
        refresh_token: &str,
        max_age_days: i64,
    ) -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(REFRESH_TOKEN_COOKIE, refresh_token.to_string())
            .path("/api/v1/auth")
            .max_age(actix_web::cookie::time::Duration::days(max_age_days))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    /// 注销时清空 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(REFRESH_TOKEN_COOKIE, "")
            .path("/api/v1/auth")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_access_token_roundtrip() {
        let token = encode_token(
            SECRET,
            42,
            "teacher",
            TokenType::Access,
            chrono::Duration::minutes(5),
        )
        .unwrap();
        let claims = decode_token(SECRET, &token, TokenType::Access).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role, "teacher");
    }

    #[test]
    fn test_token_type_mismatch_rejected() {
        let token = encode_token(
            SECRET,
            1,
            "student",
            TokenType::Refresh,
            chrono::Duration::days(1),
        )
        .unwrap();
        assert!(decode_token(SECRET, &token, TokenType::Access).is_err());
        assert!(decode_token(SECRET, &token, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode_token(
            SECRET,
            1,
            "admin",
            TokenType::Access,
            chrono::Duration::minutes(5),
        )
        .unwrap();
        assert!(decode_token("other-secret", &token, TokenType::Access).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = encode_token(
            SECRET,
            1,
            "admin",
            TokenType::Access,
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(decode_token(SECRET, &token, TokenType::Access).is_err());
    }
}
