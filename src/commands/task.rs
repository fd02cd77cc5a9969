//! Task Commands
//!
//! Each call goes through the coordinator, so the store already shows the
//! change when the call starts. Failures are logged here; the coordinator has
//! rolled the store back by the time they return.

use taskboard_core::domain::{
    CreateTaskInput, DomainError, DomainResult, Task, TaskId, TaskStatus, UpdateTaskInput,
};
use taskboard_core::loader::HydrateOutcome;
use taskboard_core::validation::{validate_create_input, validate_update_input};
use taskboard_core::TaskBoard;

fn report<T>(action: &str, id: Option<&TaskId>, result: DomainResult<T>) -> DomainResult<T> {
    if let Err(e) = &result {
        match (e, id) {
            (DomainError::DuplicateInFlight(_), _) => log::debug!("[CMD] {} ignored: {}", action, e),
            (_, Some(id)) => log::warn!("[CMD] {} {} failed: {}", action, id, e),
            (_, None) => log::warn!("[CMD] {} failed: {}", action, e),
        }
    }
    result
}

// ========================
// Commands
// ========================

pub async fn load_tasks(board: &TaskBoard) -> DomainResult<HydrateOutcome> {
    report("load_tasks", None, board.loader.hydrate().await)
}

pub async fn create_task(
    board: &TaskBoard,
    title: &str,
    description: Option<&str>,
) -> DomainResult<Task> {
    let mut input = CreateTaskInput::new(title.trim()).with_status(TaskStatus::Pending);
    if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
        input = input.with_description(description);
    }
    validate_create_input(&input)?;
    report("create_task", None, board.coordinator.create_task(input).await)
}

pub async fn update_task(board: &TaskBoard, id: &TaskId, input: UpdateTaskInput) -> DomainResult<Task> {
    validate_update_input(&input)?;
    report("update_task", Some(id), board.coordinator.update_task(id, input).await)
}

pub async fn toggle_task(board: &TaskBoard, id: &TaskId) -> DomainResult<Task> {
    report("toggle_task", Some(id), board.coordinator.toggle_task_status(id).await)
}

pub async fn delete_task(board: &TaskBoard, id: &TaskId) -> DomainResult<()> {
    report("delete_task", Some(id), board.coordinator.delete_task(id).await)
}

/// Make the mock backend reject its next request; returns how many are queued
pub fn fail_next_request(board: &TaskBoard) -> u32 {
    board.server.inject_failures(1);
    let queued = board.server.pending_failures();
    log::info!("[CMD] next {} request(s) will fail", queued);
    queued
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::config::ServerConfig;

    #[tokio::test]
    async fn test_fail_next_request_rolls_back_one_create() {
        let board = TaskBoard::new(ServerConfig::test());

        assert_eq!(fail_next_request(&board), 1);
        let failed = create_task(&board, "Doomed", None).await;
        assert!(matches!(failed, Err(DomainError::Backend(_))));
        assert!(board.store.is_empty());
        assert_eq!(board.server.pending_failures(), 0);

        let created = create_task(&board, "Kept", Some("  ")).await.unwrap();
        assert_eq!(created.description, None);
        assert_eq!(board.store.tasks(), vec![created]);
    }

    #[tokio::test]
    async fn test_invalid_title_never_reaches_backend() {
        let board = TaskBoard::new(ServerConfig::test());
        assert!(matches!(
            create_task(&board, "   ", None).await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(board.server.request_count(), 0);
    }
}
