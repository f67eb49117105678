//! 应用配置：~/.todo/config.toml + `.env` / 环境变量覆盖

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{default_database_path, load_toml, todo_dir};
use crate::error::{Result, TodoError};

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// HTTP 监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite:///relative`, `sqlite:////absolute`, a bare path, or `:memory:`.
    /// Defaults to ~/.todo/todo.db
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

fn default_pool_size() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u32 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// 跨域配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Front-end origins allowed to call the API; `"*"` allows any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:5173",
        "http://localhost:5174",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:5174",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl CorsConfig {
    /// Whether any origin is allowed
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Where the SQLite database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    File(PathBuf),
}

impl DatabaseUrl {
    /// 解析数据库 URL（与 SQLAlchemy 的 sqlite 写法一致）
    /// "sqlite:///todo.db"     → File("todo.db")（相对路径）
    /// "sqlite:////var/todo.db" → File("/var/todo.db")（绝对路径）
    /// "sqlite://" / "sqlite::memory:" → Memory
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(TodoError::config(format!("empty database url: {:?}", url)));
        }
        if trimmed.contains("://") && !trimmed.starts_with("sqlite://") {
            return Err(TodoError::config(format!(
                "unsupported database url (only sqlite is supported): {}",
                url
            )));
        }

        // the third slash separates an empty host from the path
        let rest = trimmed
            .strip_prefix("sqlite:///")
            .or_else(|| trimmed.strip_prefix("sqlite://"))
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);

        if rest.is_empty() || rest == ":memory:" {
            return Ok(Self::Memory);
        }
        Ok(Self::File(PathBuf::from(rest)))
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "sqlite::memory:"),
            Self::File(path) => write!(f, "sqlite:///{}", path.display()),
        }
    }
}

impl Config {
    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.database.url = Some(url);
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// 解析最终使用的数据库位置
    pub fn database_url(&self) -> Result<DatabaseUrl> {
        match self.database.url.as_deref() {
            Some(url) => DatabaseUrl::parse(url),
            None => Ok(DatabaseUrl::File(default_database_path())),
        }
    }
}

/// 获取配置文件路径
pub fn config_path() -> PathBuf {
    todo_dir().join("config.toml")
}

/// 加载配置（不存在则返回默认值）
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_toml(&path)
}
