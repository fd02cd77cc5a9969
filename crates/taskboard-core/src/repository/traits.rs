//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for task data access.
//! The façade depends only on this trait, never on the transport behind it.

use async_trait::async_trait;

use crate::domain::{CreateTaskInput, DomainResult, Task, TaskId, UpdateTaskInput};

/// Task storage as seen by the operations façade.
///
/// All operations are async so the backing source may be remote.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// List every task in backend order
    async fn find_all(&self) -> DomainResult<Vec<Task>>;

    /// Find a task by ID, `None` if the backend does not know it
    async fn find_by_id(&self, id: &TaskId) -> DomainResult<Option<Task>>;

    /// Create a task; the backend assigns id and timestamps
    async fn create(&self, input: &CreateTaskInput) -> DomainResult<Task>;

    /// Apply a partial update and return the stored result
    async fn update(&self, id: &TaskId, input: &UpdateTaskInput) -> DomainResult<Task>;

    /// Delete a task by ID
    async fn delete(&self, id: &TaskId) -> DomainResult<()>;
}
