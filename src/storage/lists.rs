//! 清单表的数据访问
//!
//! 清单拥有其下的任务：删除清单时在同一事务里先删任务，再删清单。

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tasks::{self, NewTask, Task};
use crate::error::Result;

/// 清单数据（带任务）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub tasks: Vec<Task>,
}

/// 新建清单参数
#[derive(Debug, Clone, Default)]
pub struct NewList {
    pub name: String,
    pub description: Option<String>,
    /// Created and attached together with the list
    pub tasks: Vec<NewTask>,
}

/// Row without its tasks
struct ListRow {
    id: i64,
    name: String,
    description: Option<String>,
}

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<ListRow> {
    Ok(ListRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn with_tasks(conn: &Connection, row: ListRow) -> Result<TaskList> {
    let tasks = tasks::list_tasks_by_list(conn, row.id)?;
    Ok(TaskList {
        id: row.id,
        name: row.name,
        description: row.description,
        tasks,
    })
}

/// 创建清单（连同初始任务）
///
/// Run inside a transaction so the list and its initial tasks land together.
pub fn create_list(conn: &Connection, new: &NewList) -> Result<TaskList> {
    conn.execute(
        "INSERT INTO lists (name, description) VALUES (?1, ?2)",
        params![new.name, new.description],
    )?;
    let id = conn.last_insert_rowid();

    for task in &new.tasks {
        tasks::create_task(
            conn,
            &NewTask {
                list_id: Some(id),
                ..task.clone()
            },
        )?;
    }
    debug!(list_id = id, initial_tasks = new.tasks.len(), "list created");

    let row = conn.query_row(
        "SELECT id, name, description FROM lists WHERE id = ?1",
        params![id],
        list_from_row,
    )?;
    with_tasks(conn, row)
}

/// 按 ID 获取清单
pub fn get_list(conn: &Connection, id: i64) -> Result<Option<TaskList>> {
    let row = conn
        .query_row(
            "SELECT id, name, description FROM lists WHERE id = ?1",
            params![id],
            list_from_row,
        )
        .optional()?;
    row.map(|row| with_tasks(conn, row)).transpose()
}

/// 全部清单（按插入顺序）
pub fn list_lists(conn: &Connection) -> Result<Vec<TaskList>> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM lists ORDER BY id")?;
    let rows = stmt
        .query_map([], list_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(|row| with_tasks(conn, row)).collect()
}

/// 清单是否存在
pub fn list_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM lists WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// 清单名是否已被占用
pub fn name_taken(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM lists WHERE name = ?1", params![name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// 删除清单及其任务，不存在时返回 false
pub fn delete_list(conn: &Connection, id: i64) -> Result<bool> {
    if !list_exists(conn, id)? {
        return Ok(false);
    }
    let removed_tasks = tasks::delete_tasks_in_list(conn, id)?;
    conn.execute("DELETE FROM lists WHERE id = ?1", params![id])?;
    debug!(list_id = id, removed_tasks, "list deleted");
    Ok(true)
}
