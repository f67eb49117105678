//! 任务表的数据访问
//!
//! 所有函数都接收 `&Connection`（事务可 deref 为连接），不持有状态。
//! 找不到记录时返回 `None` / `false`，而不是错误。

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

const TASK_COLUMNS: &str =
    "id, title, description, completed, created_at, updated_at, completed_at, list_id";

/// 任务数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// None until the first modification
    pub updated_at: Option<DateTime<Utc>>,
    /// Set iff `completed` is true
    pub completed_at: Option<DateTime<Utc>>,
    pub list_id: Option<i64>,
}

/// 新建任务参数
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub list_id: Option<i64>,
}

/// 部分更新：None 表示保持不变
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        completed_at: row.get(6)?,
        list_id: row.get(7)?,
    })
}

fn query_tasks(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let tasks = stmt
        .query_map(params, task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

/// 创建任务
pub fn create_task(conn: &Connection, new: &NewTask) -> Result<Task> {
    conn.execute(
        "INSERT INTO tasks (title, description, completed, created_at, list_id)
         VALUES (?1, ?2, 0, ?3, ?4)",
        params![new.title, new.description, Utc::now(), new.list_id],
    )?;
    let id = conn.last_insert_rowid();
    debug!(task_id = id, list_id = ?new.list_id, "task created");

    let task = conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        task_from_row,
    )?;
    Ok(task)
}

/// 按 ID 获取任务
pub fn get_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

/// 全部任务（按插入顺序）
pub fn list_tasks(conn: &Connection) -> Result<Vec<Task>> {
    query_tasks(
        conn,
        &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"),
        [],
    )
}

/// 某个清单下的任务
pub fn list_tasks_by_list(conn: &Connection, list_id: i64) -> Result<Vec<Task>> {
    query_tasks(
        conn,
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE list_id = ?1 ORDER BY id"),
        params![list_id],
    )
}

/// 部分更新任务，返回更新后的任务
pub fn update_task(conn: &Connection, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
    let Some(mut task) = get_task(conn, id)? else {
        return Ok(None);
    };
    if update.is_empty() {
        return Ok(Some(task));
    }

    let now = Utc::now();
    if let Some(title) = &update.title {
        task.title = title.clone();
    }
    if let Some(description) = &update.description {
        task.description = Some(description.clone());
    }
    if let Some(completed) = update.completed {
        apply_completion(&mut task, completed, now);
    }
    task.updated_at = Some(now);

    conn.execute(
        "UPDATE tasks
         SET title = ?1, description = ?2, completed = ?3, completed_at = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            task.title,
            task.description,
            task.completed,
            task.completed_at,
            task.updated_at,
            id
        ],
    )?;
    debug!(task_id = id, "task updated");
    get_task(conn, id)
}

/// 标记完成 / 未完成；状态相同时不做修改
pub fn set_completed(conn: &Connection, id: i64, completed: bool) -> Result<Option<Task>> {
    let Some(mut task) = get_task(conn, id)? else {
        return Ok(None);
    };
    if task.completed == completed {
        return Ok(Some(task));
    }

    let now = Utc::now();
    apply_completion(&mut task, completed, now);
    conn.execute(
        "UPDATE tasks SET completed = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4",
        params![task.completed, task.completed_at, now, id],
    )?;
    debug!(task_id = id, completed, "task completion changed");
    get_task(conn, id)
}

/// Keeps `completed_at` in step with `completed`
fn apply_completion(task: &mut Task, completed: bool, now: DateTime<Utc>) {
    if task.completed == completed {
        return;
    }
    task.completed = completed;
    task.completed_at = completed.then_some(now);
}

/// 删除任务，不存在时返回 false
pub fn delete_task(conn: &Connection, id: i64) -> Result<bool> {
    let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    if removed > 0 {
        debug!(task_id = id, "task deleted");
    }
    Ok(removed > 0)
}

/// 删除某清单下的全部任务，返回删除数量
pub fn delete_tasks_in_list(conn: &Connection, list_id: i64) -> Result<usize> {
    let removed = conn.execute("DELETE FROM tasks WHERE list_id = ?1", params![list_id])?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_connection;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_task_defaults() {
        let conn = test_connection();
        let task = create_task(&conn, &new_task("Write report")).unwrap();

        assert_eq!(task.title, "Write report");
        assert!(!task.completed);
        assert!(task.description.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.updated_at.is_none());
        assert!(task.list_id.is_none());
    }

    #[test]
    fn test_ids_are_unique_and_not_reused() {
        let conn = test_connection();
        let first = create_task(&conn, &new_task("a")).unwrap();
        let second = create_task(&conn, &new_task("b")).unwrap();
        assert_ne!(first.id, second.id);

        assert!(delete_task(&conn, second.id).unwrap());
        let third = create_task(&conn, &new_task("c")).unwrap();
        assert!(third.id > second.id);
    }

    #[test]
    fn test_missing_ids_report_absence() {
        let conn = test_connection();
        assert!(get_task(&conn, 42).unwrap().is_none());
        assert!(update_task(&conn, 42, &TaskUpdate::default())
            .unwrap()
            .is_none());
        assert!(set_completed(&conn, 42, true).unwrap().is_none());
        assert!(!delete_task(&conn, 42).unwrap());
    }

    #[test]
    fn test_list_tasks_in_insertion_order() {
        let conn = test_connection();
        for title in ["one", "two", "three"] {
            create_task(&conn, &new_task(title)).unwrap();
        }
        let titles: Vec<String> = list_tasks(&conn)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let conn = test_connection();
        let task = create_task(
            &conn,
            &NewTask {
                title: "Draft".to_string(),
                description: Some("first pass".to_string()),
                list_id: None,
            },
        )
        .unwrap();
        set_completed(&conn, task.id, true).unwrap();

        let updated = update_task(
            &conn,
            task.id,
            &TaskUpdate {
                title: Some("Final".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.description.as_deref(), Some("first pass"));
        assert!(updated.completed);
        assert!(updated.completed_at.is_some());
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_completed_tracks_completed_at() {
        let conn = test_connection();
        let task = create_task(&conn, &new_task("Ship")).unwrap();

        let done = update_task(
            &conn,
            task.id,
            &TaskUpdate {
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let undone = update_task(
            &conn,
            task.id,
            &TaskUpdate {
                completed: Some(false),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let conn = test_connection();
        let task = create_task(&conn, &new_task("Idle")).unwrap();
        let same = update_task(&conn, task.id, &TaskUpdate::default())
            .unwrap()
            .unwrap();
        assert_eq!(same, task);
    }

    #[test]
    fn test_mark_completed_then_uncompleted() {
        let conn = test_connection();
        let task = create_task(&conn, &new_task("Laundry")).unwrap();

        set_completed(&conn, task.id, true).unwrap();
        let fetched = get_task(&conn, task.id).unwrap().unwrap();
        assert!(fetched.completed);
        assert!(fetched.completed_at.is_some());

        set_completed(&conn, task.id, false).unwrap();
        let fetched = get_task(&conn, task.id).unwrap().unwrap();
        assert!(!fetched.completed);
        assert!(fetched.completed_at.is_none());
    }

    #[test]
    fn test_redundant_completion_is_a_no_op() {
        let conn = test_connection();
        let task = create_task(&conn, &new_task("Once")).unwrap();
        let first = set_completed(&conn, task.id, true).unwrap().unwrap();
        let second = set_completed(&conn, task.id, true).unwrap().unwrap();
        assert_eq!(first.completed_at, second.completed_at);
    }

    #[test]
    fn test_dangling_list_id_is_rejected() {
        let conn = test_connection();
        let result = create_task(
            &conn,
            &NewTask {
                title: "Orphan".to_string(),
                description: None,
                list_id: Some(999),
            },
        );
        assert!(result.is_err());
    }
}
