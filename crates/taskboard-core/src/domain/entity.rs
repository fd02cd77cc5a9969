//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities,
//! together with the error type shared by every layer of the core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::TaskId;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    /// Rejected by the form layer before reaching the coordinator
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Task with id {0} not found")]
    NotFound(TaskId),
    /// A toggle for the same task is still waiting on the backend
    #[error("Mutation already in progress for task {0}")]
    DuplicateInFlight(TaskId),
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DomainError {
    pub fn backend(msg: impl Into<String>) -> Self {
        DomainError::Backend(msg.into())
    }
}
