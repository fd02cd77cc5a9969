//! Domain Layer
//!
//! Contains the task entity, its partial shapes and the shared error type.
//! This layer has no dependency on storage or transport.

mod entity;
mod task;

pub use entity::{DomainError, DomainResult, Entity};
pub use task::{
    next_timestamp, CreateTaskInput, Task, TaskId, TaskPatch, TaskStatus, UpdateTaskInput,
    TEMP_ID_PREFIX,
};
pub(crate) use task::deserialize_nullable;
