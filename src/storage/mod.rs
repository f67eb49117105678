pub mod config;
pub mod db;
pub mod lists;
pub mod schema;
pub mod stats;
pub mod tasks;

use std::path::{Path, PathBuf};

/// 获取 ~/.todo/ 目录路径（无 home 目录时退回当前目录）
pub fn todo_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".todo")
}

/// 默认数据库文件: ~/.todo/todo.db
pub fn default_database_path() -> PathBuf {
    todo_dir().join("todo.db")
}

/// 从 TOML 文件加载反序列化数据
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> crate::error::Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// In-memory connection with the schema applied and foreign keys enforced
#[cfg(test)]
pub(crate) fn test_connection() -> rusqlite::Connection {
    let mut conn = rusqlite::Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .expect("enable foreign keys");
    schema::run_migrations(&mut conn).expect("migrate");
    conn
}
