//! Task Commands
//!
//! Status toggle and priority update.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::{HttpApi, TaskApi};
use crate::error::SyncError;
use crate::models::{Priority, PriorityResponse, TaskId, ToggleStatusResponse, UpdatePriorityArgs};

fn task_path(task_id: &TaskId, action: &str) -> String {
    let id = utf8_percent_encode(task_id.as_str(), NON_ALPHANUMERIC);
    format!("/api/tasks/{}/{}", id, action)
}

fn toggle_status_path(task_id: &TaskId) -> String {
    task_path(task_id, "toggle-status")
}

fn update_priority_path(task_id: &TaskId) -> String {
    task_path(task_id, "update-priority")
}

#[async_trait(?Send)]
impl TaskApi for HttpApi {
    async fn toggle_status(&self, task_id: &TaskId) -> Result<ToggleStatusResponse, SyncError> {
        self.post(&toggle_status_path(task_id), None).await
    }

    async fn update_priority(
        &self,
        task_id: &TaskId,
        priority: Priority,
    ) -> Result<PriorityResponse, SyncError> {
        let body = serde_json::to_string(&UpdatePriorityArgs { priority })
            .map_err(|source| SyncError::Malformed { status: 0, source })?;
        self.post(&update_priority_path(task_id), Some(body)).await
    }
}
