//! Repository Layer
//!
//! Data access abstraction and its mock-backend implementation.

mod traits;
mod mock_repo;

#[cfg(test)]
mod tests;

pub use traits::TaskRepository;
pub use mock_repo::MockTaskRepository;
