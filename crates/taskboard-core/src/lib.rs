//! Taskboard Core
//!
//! Layered architecture:
//! - domain: Task entity, partial shapes and errors
//! - repository: Data access abstraction and the mock API implementation
//! - server: In-memory mock backend
//! - usecases: Task operations façade
//! - store: UI state store
//! - coordinator: Optimistic mutations over store and façade
//! - loader: One-time hydration of the store

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod loader;
pub mod repository;
pub mod server;
pub mod store;
pub mod usecases;
pub mod validation;

mod timer;

use std::sync::Arc;

use config::ServerConfig;
use coordinator::OptimisticCoordinator;
use loader::InitialLoader;
use repository::MockTaskRepository;
use server::MockServer;
use store::UiStore;
use usecases::TaskUseCases;

/// Everything the frontend needs, wired together once at startup
#[derive(Clone)]
pub struct TaskBoard {
    pub server: Arc<MockServer>,
    pub store: UiStore,
    pub use_cases: TaskUseCases,
    pub coordinator: OptimisticCoordinator,
    pub loader: InitialLoader,
}

impl TaskBoard {
    /// Build the mock backend, store and coordinator from config
    pub fn new(config: ServerConfig) -> Self {
        let server = Arc::new(MockServer::new(config));
        let repository = Arc::new(MockTaskRepository::new(server.clone()));
        let use_cases = TaskUseCases::new(repository);
        let store = UiStore::new();

        Self {
            coordinator: OptimisticCoordinator::new(store.clone(), use_cases.clone()),
            loader: InitialLoader::new(store.clone(), use_cases.clone()),
            server,
            store,
            use_cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateTaskInput, TaskStatus};

    #[tokio::test]
    async fn test_board_end_to_end() {
        let mut config = ServerConfig::default();
        config.latency_ms = 0;
        let board = TaskBoard::new(config);

        board.loader.hydrate().await.unwrap();
        assert_eq!(board.store.len(), 2);

        let created = board
            .coordinator
            .create_task(CreateTaskInput::new("Buy milk"))
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "3");

        let toggled = board.coordinator.toggle_task_status(&created.id).await.unwrap();
        assert_eq!(toggled.status, TaskStatus::Completed);
        assert_eq!(board.store.find(&created.id).unwrap().status, TaskStatus::Completed);

        board.coordinator.delete_task(&created.id).await.unwrap();
        assert_eq!(board.store.len(), 2);
        assert_eq!(board.server.tasks().len(), 2);
    }
}
