use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JudgeConfig {
    /// Root URL of the Judge0-compatible service (e.g. "https://ce.judge0.com").
    pub base_url: String,
    /// RapidAPI key, when the judge is behind RapidAPI.
    pub api_key: Option<String>,
    /// Per-evaluation HTTP timeout. A hung judge call otherwise blocks the
    /// whole grading request indefinitely.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Redis connection URL. When absent, an in-process cache is used.
    pub url: Option<String>,
    /// TTL for cached test-case sets, in seconds.
    pub testcase_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Maximum submitted source size in bytes.
    pub max_code_size: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_code_size: 65_536,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub judge: JudgeConfig,
    pub cache: CacheConfig,
    pub submission: SubmissionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("judge.timeout_secs", 30)?
            .set_default("cache.testcase_ttl_secs", 3600)?
            .set_default("submission.max_code_size", 65_536)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CRUCIBLE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("CRUCIBLE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
