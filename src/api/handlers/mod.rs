//! API handlers

pub mod lists;
pub mod root;
pub mod stats;
pub mod tasks;

use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Deletion confirmation, e.g. `{"detail": "Task deleted"}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}

/// Reject blank titles and names
fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
