//! List API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{require_text, DetailResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::error::TodoError;
use crate::storage::{
    lists::{self, NewList, TaskList},
    tasks::{self, NewTask, Task},
};

// ============================================================================
// Request DTOs
// ============================================================================

/// Task inside a list request (`list_id` comes from the list)
#[derive(Debug, Deserialize)]
pub struct ListTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ListTaskRequest> for NewTask {
    fn from(req: ListTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            list_id: None,
        }
    }
}

/// Create list request
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Initial tasks, created together with the list
    #[serde(default)]
    pub tasks: Option<Vec<ListTaskRequest>>,
}

const LIST_NOT_FOUND: ApiError = ApiError::NotFound("List not found");

fn duplicate_name(name: &str) -> ApiError {
    ApiError::Conflict(format!("List '{}' already exists", name))
}

/// A constraint violation on insert means a concurrent request took the name
fn name_conflict(err: TodoError, name: &str) -> ApiError {
    match &err {
        TodoError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            duplicate_name(name)
        }
        _ => ApiError::from(err),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// POST /lists
pub async fn create_list(
    State(state): State<AppState>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<Json<TaskList>> {
    require_text("name", &req.name)?;
    let initial = req.tasks.unwrap_or_default();
    for task in &initial {
        require_text("title", &task.title)?;
    }
    let new = NewList {
        name: req.name,
        description: req.description,
        tasks: initial.into_iter().map(NewTask::from).collect(),
    };

    let list = state
        .run(move |tx| {
            if lists::name_taken(tx, &new.name)? {
                return Err(duplicate_name(&new.name));
            }
            lists::create_list(tx, &new).map_err(|e| name_conflict(e, &new.name))
        })
        .await?;
    Ok(Json(list))
}

/// GET /lists
pub async fn list_lists(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskList>>> {
    let lists = state.query(|tx| lists::list_lists(tx)).await?;
    Ok(Json(lists))
}

/// GET /lists/{id}
pub async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskList>> {
    state
        .query(move |tx| lists::get_list(tx, id))
        .await?
        .map(Json)
        .ok_or(LIST_NOT_FOUND)
}

/// DELETE /lists/{id}
/// Deletes the list and every task in it
pub async fn delete_list(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DetailResponse>> {
    if !state.query(move |tx| lists::delete_list(tx, id)).await? {
        return Err(LIST_NOT_FOUND);
    }
    Ok(Json(DetailResponse::new("List deleted")))
}

/// GET /lists/{id}/tasks
/// An existing list with no tasks gives `[]`
pub async fn list_tasks_in_list(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state
        .run(move |tx| {
            if !lists::list_exists(tx, id)? {
                return Err(LIST_NOT_FOUND);
            }
            Ok(tasks::list_tasks_by_list(tx, id)?)
        })
        .await?;
    Ok(Json(tasks))
}

/// POST /lists/{id}/tasks
pub async fn create_task_in_list(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ListTaskRequest>,
) -> ApiResult<Json<Task>> {
    require_text("title", &req.title)?;
    let new = NewTask {
        list_id: Some(id),
        ..NewTask::from(req)
    };

    let task = state
        .run(move |tx| {
            if !lists::list_exists(tx, id)? {
                return Err(LIST_NOT_FOUND);
            }
            Ok(tasks::create_task(tx, &new)?)
        })
        .await?;
    Ok(Json(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_connection;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let conn = test_connection();
        let new = NewList {
            name: "Chores".to_string(),
            ..Default::default()
        };
        lists::create_list(&conn, &new).unwrap();

        // a second insert that skipped the name_taken check
        let err = lists::create_list(&conn, &new).unwrap_err();
        match name_conflict(err, &new.name) {
            ApiError::Conflict(detail) => assert_eq!(detail, "List 'Chores' already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_other_store_errors_stay_internal() {
        let err = name_conflict(TodoError::internal("pool closed"), "Chores");
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
