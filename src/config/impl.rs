use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 直接读取的环境变量与对应配置键
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
    ("REDIS_URL", "cache.redis.url"),
    ("REDIS_KEY_PREFIX", "cache.redis.key_prefix"),
    ("CACHE_TTL", "cache.default_ttl"),
    ("QUIZ_SUBMIT_GRACE_SECONDS", "quiz.submit_grace_seconds"),
];

fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in ENV_OVERRIDES {
        builder = builder.set_override_option(*key, std::env::var(var).ok())?;
    }
    Ok(builder)
}

impl AppConfig {
    /// 按 config.toml、config.{APP_ENV}.toml、LMS_* 环境变量、直接环境变量的顺序叠加
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{environment}")).required(false))
            .add_source(
                Environment::with_prefix("LMS")
                    .separator("_")
                    .try_parsing(true),
            );

        let mut app_config: AppConfig = apply_env_overrides(builder)?
            .build()?
            .try_deserialize()?;

        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        app_config.validate()?;
        Ok(app_config)
    }

    /// 加载后的取值检查
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set in production".to_string(),
            ));
        }
        if self.jwt.access_token_expiry <= 0 || self.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "token expiry must be positive".to_string(),
            ));
        }

        let g = &self.grading;
        let weights = [
            g.assignments_weight,
            g.quizzes_weight,
            g.midterm_weight,
            g.final_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(ConfigError::Message(
                "grading weights must not be negative".to_string(),
            ));
        }
        if (weights.iter().sum::<f64>() - 100.0).abs() > 0.01 {
            return Err(ConfigError::Message(
                "grading weights must sum to 100".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&g.passing_grade) {
            return Err(ConfigError::Message(
                "grading.passing_grade must be within 0..=100".to_string(),
            ));
        }
        if self.quiz.submit_grace_seconds < 0 {
            return Err(ConfigError::Message(
                "quiz.submit_grace_seconds must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// 全局配置；未初始化时现场加载，失败直接退出进程
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 启动时调用一次
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 配置为空串时视为未启用
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(
                include_str!("../../config.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert!(config.database.url.starts_with("sqlite://"));
    }

    #[test]
    fn test_weights_must_sum_to_hundred() {
        let mut config = sample();
        config.grading.final_weight += 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = sample();
        config.app.environment = "production".to_string();
        config.jwt.secret = "  ".to_string();
        assert!(config.validate().is_err());
        config.jwt.secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_address() {
        let mut config = sample();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9000;
        assert_eq!(config.server_bind_address(), "127.0.0.1:9000");
    }
}
