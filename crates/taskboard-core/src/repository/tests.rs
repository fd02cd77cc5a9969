//! Repository Integration Tests
//!
//! Tests for MockTaskRepository against an unseeded, zero-latency mock backend.

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::domain::{CreateTaskInput, DomainError, TaskId, TaskStatus, UpdateTaskInput};
    use crate::repository::{MockTaskRepository, TaskRepository};
    use crate::server::MockServer;
    use std::sync::Arc;

    fn setup_test_repo() -> MockTaskRepository {
        MockTaskRepository::new(Arc::new(MockServer::new(ServerConfig::test())))
    }

    #[tokio::test]
    async fn test_create_task() {
        let repo = setup_test_repo();

        let created = repo
            .create(&CreateTaskInput::new("Test task").with_description("details"))
            .await
            .expect("Failed to create");

        assert_eq!(created.id.as_str(), "1");
        assert_eq!(created.title, "Test task");
        assert_eq!(created.description.as_deref(), Some("details"));
        assert_eq!(created.status, TaskStatus::Pending);
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = setup_test_repo();

        let created = repo.create(&CreateTaskInput::new("Find me")).await.unwrap();

        let found = repo.find_by_id(&created.id).await.expect("Find failed");
        assert_eq!(found.map(|t| t.title), Some("Find me".to_string()));

        let missing = repo.find_by_id(&TaskId::from("404")).await.expect("Find failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_all_keeps_backend_order() {
        let repo = setup_test_repo();

        repo.create(&CreateTaskInput::new("Task 1")).await.unwrap();
        repo.create(&CreateTaskInput::new("Task 2")).await.unwrap();

        let tasks = repo.find_all().await.expect("List failed");
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Task 1", "Task 2"]);
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let repo = setup_test_repo();

        let created = repo
            .create(&CreateTaskInput::new("Notes").with_description("old notes"))
            .await
            .unwrap();

        let cleared = repo
            .update(&created.id, &UpdateTaskInput::default().with_description(""))
            .await
            .expect("Update failed");
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.title, "Notes");

        let stored = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.description, None);
    }

    #[tokio::test]
    async fn test_update_task() {
        let repo = setup_test_repo();

        let created = repo.create(&CreateTaskInput::new("Original")).await.unwrap();

        let updated = repo
            .update(
                &created.id,
                &UpdateTaskInput {
                    title: Some("Updated".to_string()),
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .expect("Update failed");
        assert_eq!(updated.title, "Updated");
        assert!(updated.is_completed());
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = setup_test_repo();
        let id = TaskId::from("9");

        let result = repo.update(&id, &UpdateTaskInput::title("x")).await;
        assert_eq!(result, Err(DomainError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_delete_task() {
        let repo = setup_test_repo();

        let created = repo.create(&CreateTaskInput::new("To delete")).await.unwrap();

        repo.delete(&created.id).await.expect("Delete failed");

        let found = repo.find_by_id(&created.id).await.expect("Find failed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_server_failure_is_backend_error() {
        let repo = setup_test_repo();
        repo.server().inject_failures(1);

        let result = repo.find_all().await;
        assert_eq!(result, Err(DomainError::Backend("Injected failure".to_string())));
    }

    #[tokio::test]
    async fn test_rejected_create_surfaces_server_message() {
        let repo = setup_test_repo();

        let result = repo.create(&CreateTaskInput::new("")).await;
        assert_eq!(result, Err(DomainError::Backend("Title is required".to_string())));
    }
}
