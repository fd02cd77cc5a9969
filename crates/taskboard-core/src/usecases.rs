//! Task Operations Façade
//!
//! Translates domain intents into repository calls. Every method returns a
//! deferred result that may fail.

use std::sync::Arc;

use crate::domain::{CreateTaskInput, DomainError, DomainResult, Task, TaskId, UpdateTaskInput};
use crate::repository::TaskRepository;

#[derive(Clone)]
pub struct TaskUseCases {
    repository: Arc<dyn TaskRepository>,
}

impl TaskUseCases {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_all_tasks(&self) -> DomainResult<Vec<Task>> {
        self.repository.find_all().await
    }

    pub async fn get_task(&self, id: &TaskId) -> DomainResult<Option<Task>> {
        self.repository.find_by_id(id).await
    }

    /// Create a task, defaulting the status to pending
    pub async fn create_task(&self, input: CreateTaskInput) -> DomainResult<Task> {
        let input = CreateTaskInput {
            status: Some(input.status.unwrap_or_default()),
            ..input
        };
        self.repository.create(&input).await
    }

    pub async fn update_task(&self, id: &TaskId, input: &UpdateTaskInput) -> DomainResult<Task> {
        self.repository.update(id, input).await
    }

    pub async fn delete_task(&self, id: &TaskId) -> DomainResult<()> {
        self.repository.delete(id).await
    }

    /// Flip the status the backend currently holds
    pub async fn toggle_task_status(&self, id: &TaskId) -> DomainResult<Task> {
        let task = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(id.clone()))?;

        let input = UpdateTaskInput::status(task.status.toggled());
        self.repository.update(id, &input).await
    }
}
