//! todo 统一错误类型定义
//!
//! 使用 `thiserror` 库提供统一的错误处理，支持错误链式传播。
//! "not found" 不是错误：存储层以 `Option` / `bool` 返回缺失。

use std::io;
use thiserror::Error;

/// todo 错误类型
#[derive(Debug, Error)]
pub enum TodoError {
    /// I/O 错误（配置文件、数据目录等）
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// SQLite 错误
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// 连接池错误
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// TOML 解析错误
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON 序列化错误
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Schema 迁移失败
    #[error("migration error: {0}")]
    Migration(String),

    /// 内部错误（如 blocking 任务 panic）
    #[error("internal error: {0}")]
    Internal(String),
}

/// todo Result 类型别名
pub type Result<T> = std::result::Result<T, TodoError>;

impl TodoError {
    /// 创建 Config 错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 创建 Migration 错误
    pub fn migration(msg: impl Into<String>) -> Self {
        Self::Migration(msg.into())
    }

    /// 创建 Internal 错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TodoError::config("port must be a number");
        assert_eq!(err.to_string(), "Config error: port must be a number");

        let err = TodoError::migration("v1 failed");
        assert_eq!(err.to_string(), "migration error: v1 failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TodoError = io_err.into();
        assert!(matches!(err, TodoError::Io(_)));
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: TodoError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, TodoError::Sqlite(_)));
        assert!(err.to_string().starts_with("sqlite error"));
    }
}
