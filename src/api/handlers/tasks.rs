//! Task API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{require_text, DetailResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::{
    lists,
    tasks::{self, NewTask, Task, TaskUpdate},
};

// ============================================================================
// Request DTOs
// ============================================================================

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub list_id: Option<i64>,
}

/// Update task request. Omitted and `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskUpdate {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            completed: req.completed,
        }
    }
}

const TASK_NOT_FOUND: ApiError = ApiError::NotFound("Task not found");

// ============================================================================
// API Handlers
// ============================================================================

/// GET /tasks
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.query(|tx| tasks::list_tasks(tx)).await?;
    Ok(Json(tasks))
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    require_text("title", &req.title)?;
    let new = NewTask {
        title: req.title,
        description: req.description,
        list_id: req.list_id,
    };

    let task = state
        .run(move |tx| {
            if let Some(list_id) = new.list_id {
                if !lists::list_exists(tx, list_id)? {
                    return Err(ApiError::NotFound("List not found"));
                }
            }
            Ok(tasks::create_task(tx, &new)?)
        })
        .await?;
    Ok(Json(task))
}

/// GET /tasks/{id}
pub async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Task>> {
    state
        .query(move |tx| tasks::get_task(tx, id))
        .await?
        .map(Json)
        .ok_or(TASK_NOT_FOUND)
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    if let Some(title) = &req.title {
        require_text("title", title)?;
    }
    let update = TaskUpdate::from(req);

    state
        .query(move |tx| tasks::update_task(tx, id, &update))
        .await?
        .map(Json)
        .ok_or(TASK_NOT_FOUND)
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DetailResponse>> {
    if !state.query(move |tx| tasks::delete_task(tx, id)).await? {
        return Err(TASK_NOT_FOUND);
    }
    Ok(Json(DetailResponse::new("Task deleted")))
}

/// PATCH /tasks/{id}/completed
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    set_completion(&state, id, true).await.map(Json)
}

/// PATCH /tasks/{id}/uncompleted
pub async fn uncomplete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    set_completion(&state, id, false).await.map(Json)
}

/// Check and transition in one unit of work; a redundant transition is a 400.
async fn set_completion(state: &AppState, id: i64, completed: bool) -> ApiResult<Task> {
    state
        .run(move |tx| {
            let task = tasks::get_task(tx, id)?.ok_or(TASK_NOT_FOUND)?;
            if task.completed == completed {
                return Err(ApiError::BadRequest(if completed {
                    "Task is already completed"
                } else {
                    "Task is already uncompleted"
                }));
            }
            tasks::set_completed(tx, id, completed)?.ok_or(TASK_NOT_FOUND)
        })
        .await
}
