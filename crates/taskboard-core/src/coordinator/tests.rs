//! Coordinator Tests
//!
//! The repository here waits on a semaphore before every call, so a test can
//! look at the store while a mutation is still waiting on the backend.

use std::sync::Arc;

use async_trait::async_trait;
use futures::poll;
use tokio::sync::Semaphore;

use super::*;
use crate::config::ServerConfig;
use crate::domain::{DomainError, TaskStatus};
use crate::repository::{MockTaskRepository, TaskRepository};
use crate::server::{to_wire_timestamp, MockServer, TaskRecord};

struct GatedRepository {
    inner: MockTaskRepository,
    gate: Arc<Semaphore>,
}

impl GatedRepository {
    async fn wait(&self) {
        self.gate.acquire().await.expect("gate closed").forget();
    }
}

#[async_trait]
impl TaskRepository for GatedRepository {
    async fn find_all(&self) -> DomainResult<Vec<Task>> {
        self.wait().await;
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: &TaskId) -> DomainResult<Option<Task>> {
        self.wait().await;
        self.inner.find_by_id(id).await
    }

    async fn create(&self, input: &CreateTaskInput) -> DomainResult<Task> {
        self.wait().await;
        self.inner.create(input).await
    }

    async fn update(&self, id: &TaskId, input: &UpdateTaskInput) -> DomainResult<Task> {
        self.wait().await;
        self.inner.update(id, input).await
    }

    async fn delete(&self, id: &TaskId) -> DomainResult<()> {
        self.wait().await;
        self.inner.delete(id).await
    }
}

struct Harness {
    server: Arc<MockServer>,
    gate: Arc<Semaphore>,
    store: UiStore,
    coordinator: OptimisticCoordinator,
}

impl Harness {
    /// Backend calls block until `release` is called
    fn gated() -> Self {
        Self::with_permits(0)
    }

    /// Backend calls go straight through
    fn open() -> Self {
        Self::with_permits(Semaphore::MAX_PERMITS)
    }

    fn with_permits(permits: usize) -> Self {
        let server = Arc::new(MockServer::new(ServerConfig::test()));
        let gate = Arc::new(Semaphore::new(permits));
        let repository = GatedRepository {
            inner: MockTaskRepository::new(server.clone()),
            gate: gate.clone(),
        };
        let store = UiStore::new();
        let coordinator =
            OptimisticCoordinator::new(store.clone(), TaskUseCases::new(Arc::new(repository)));
        Self {
            server,
            gate,
            store,
            coordinator,
        }
    }

    fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    /// Put the same task on the server and in the store
    fn seed(&self, id: &str, title: &str) -> Task {
        let task = Task::new(id, title);
        self.server.insert(TaskRecord::from(&task));
        self.store.add_task(task.clone());
        task
    }
}

fn ids(store: &UiStore) -> Vec<String> {
    store.tasks().iter().map(|t| t.id.to_string()).collect()
}

// ========================
// Create
// ========================

#[tokio::test]
async fn test_create_shows_placeholder_then_authoritative_task() {
    let h = Harness::gated();
    h.server.insert(TaskRecord {
        id: "41".into(),
        title: "Server only".into(),
        description: None,
        status: TaskStatus::Pending,
        created_at: to_wire_timestamp(chrono::Utc::now()),
        updated_at: to_wire_timestamp(chrono::Utc::now()),
    });

    let mut create = Box::pin(h.coordinator.create_task(CreateTaskInput::new("Buy milk")));
    assert!(poll!(create.as_mut()).is_pending());

    let pending = h.store.tasks();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].id.is_temporary());
    assert_eq!(pending[0].title, "Buy milk");
    assert_eq!(pending[0].status, TaskStatus::Pending);
    assert!(h.coordinator.is_in_flight(&pending[0].id));

    h.release(1);
    let created = create.await.expect("create succeeds");
    assert_eq!(created.id.as_str(), "42");

    let tasks = h.store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id.as_str(), "42");
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(h.coordinator.in_flight_count(), 0);
}

#[tokio::test]
async fn test_create_replaces_placeholder_in_place() {
    let h = Harness::gated();
    h.seed("1", "First");

    let mut create = Box::pin(h.coordinator.create_task(CreateTaskInput::new("Second")));
    assert!(poll!(create.as_mut()).is_pending());
    h.store.add_task(Task::new("local", "Added meanwhile"));

    h.release(1);
    let created = create.await.unwrap();
    assert_eq!(ids(&h.store), vec!["1".to_string(), created.id.to_string(), "local".to_string()]);
}

#[tokio::test]
async fn test_failed_create_removes_placeholder_only() {
    let h = Harness::gated();
    let existing = h.seed("1", "Keep me");

    let mut create = Box::pin(h.coordinator.create_task(CreateTaskInput::new("Doomed")));
    assert!(poll!(create.as_mut()).is_pending());
    let temp_id = h.store.tasks()[1].id.clone();
    assert!(temp_id.is_temporary());

    h.server.inject_failures(1);
    h.release(1);
    let err = create.await.unwrap_err();
    assert_eq!(err, DomainError::Backend("Injected failure".into()));

    assert!(h.store.find(&temp_id).is_none());
    assert_eq!(h.store.tasks(), vec![existing]);
    assert_eq!(h.coordinator.in_flight_count(), 0);
}

#[tokio::test]
async fn test_parallel_creates_get_distinct_placeholders() {
    let h = Harness::gated();

    let mut first = Box::pin(h.coordinator.create_task(CreateTaskInput::new("A")));
    let mut second = Box::pin(h.coordinator.create_task(CreateTaskInput::new("B")));
    assert!(poll!(first.as_mut()).is_pending());
    assert!(poll!(second.as_mut()).is_pending());

    let tasks = h.store.tasks();
    assert_eq!(tasks.len(), 2);
    assert_ne!(tasks[0].id, tasks[1].id);

    h.release(2);
    let (a, b) = tokio::join!(first, second);
    assert_ne!(a.unwrap().id, b.unwrap().id);
    assert!(h.store.tasks().iter().all(|t| !t.id.is_temporary()));
}

// ========================
// Toggle
// ========================

#[tokio::test]
async fn test_toggle_failure_restores_original_task() {
    let h = Harness::gated();
    let original = h.seed("1", "Walk the dog");
    let id = original.id.clone();

    let mut toggle = Box::pin(h.coordinator.toggle_task_status(&id));
    assert!(poll!(toggle.as_mut()).is_pending());

    let optimistic = h.store.find(&id).unwrap();
    assert_eq!(optimistic.status, TaskStatus::Completed);
    assert!(optimistic.updated_at > original.updated_at);

    h.server.inject_failures(1);
    h.release(1);
    assert!(matches!(toggle.await, Err(DomainError::Backend(_))));

    let restored = h.store.find(&id).unwrap();
    assert_eq!(restored.status, TaskStatus::Pending);
    assert_eq!(restored.updated_at, original.updated_at);
    assert_eq!(restored, original);
}

#[tokio::test]
async fn test_duplicate_toggle_is_rejected() {
    let h = Harness::gated();
    let id = h.seed("1", "Once").id;

    let mut first = Box::pin(h.coordinator.toggle_task_status(&id));
    assert!(poll!(first.as_mut()).is_pending());
    let version = h.store.version();
    let during = h.store.snapshot();

    let pending = h.coordinator.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, MutationKind::Toggle);
    assert_eq!(pending[0].phase, MutationPhase::Applying);
    assert_eq!(pending[0].previous.as_ref().map(|t| t.status), Some(TaskStatus::Pending));

    let second = h.coordinator.toggle_task_status(&id).await;
    assert_eq!(second, Err(DomainError::DuplicateInFlight(id.clone())));
    assert_eq!(h.store.version(), version);
    assert_eq!(h.store.snapshot(), during);

    // find_by_id + update
    h.release(2);
    let toggled = first.await.unwrap();
    assert_eq!(toggled.status, TaskStatus::Completed);
    assert_eq!(h.store.find(&id).unwrap().status, TaskStatus::Completed);

    // admission is released once the first toggle settles
    h.release(2);
    let back = h.coordinator.toggle_task_status(&id).await.unwrap();
    assert_eq!(back.status, TaskStatus::Pending);
}

/// What a store listener sees of the coordinator on each change
fn watch_phases(h: &Harness, id: &TaskId) -> Arc<parking_lot::Mutex<Vec<(Vec<MutationPhase>, bool)>>> {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let coordinator = h.coordinator.clone();
    let id = id.clone();
    h.store.subscribe(move |_| {
        let phases = coordinator.pending().iter().map(|r| r.phase).collect();
        sink.lock().push((phases, coordinator.is_in_flight(&id)));
    });
    seen
}

#[tokio::test]
async fn test_rollback_is_visible_as_its_own_phase() {
    let h = Harness::open();
    let id = h.seed("1", "Phases").id;
    let seen = watch_phases(&h, &id);

    h.server.inject_failures(1);
    assert!(h.coordinator.toggle_task_status(&id).await.is_err());

    assert_eq!(
        *seen.lock(),
        vec![
            (vec![MutationPhase::Applying], true),
            (vec![MutationPhase::RollingBack], false),
        ]
    );
    assert!(h.coordinator.pending().is_empty());
}

#[tokio::test]
async fn test_failed_create_passes_through_rolling_back() {
    let h = Harness::open();
    let seen = watch_phases(&h, &TaskId::from("unused"));

    h.server.inject_failures(1);
    assert!(h.coordinator.create_task(CreateTaskInput::new("Lost")).await.is_err());

    let phases: Vec<_> = seen.lock().iter().map(|(phases, _)| phases.clone()).collect();
    assert_eq!(
        phases,
        vec![vec![MutationPhase::Applying], vec![MutationPhase::RollingBack]]
    );
    assert_eq!(h.coordinator.in_flight_count(), 0);
}

#[tokio::test]
async fn test_toggles_on_different_tasks_do_not_block_each_other() {
    let h = Harness::gated();
    let a = h.seed("1", "A").id;
    let b = h.seed("2", "B").id;

    let mut first = Box::pin(h.coordinator.toggle_task_status(&a));
    let mut second = Box::pin(h.coordinator.toggle_task_status(&b));
    assert!(poll!(first.as_mut()).is_pending());
    assert!(poll!(second.as_mut()).is_pending());
    assert_eq!(h.coordinator.in_flight_count(), 2);

    h.release(4);
    let (first, second) = tokio::join!(first, second);
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(h.store.tasks().iter().all(Task::is_completed));
}

#[tokio::test]
async fn test_toggle_reconciles_with_server_record() {
    let h = Harness::open();
    let id = h.seed("1", "Sync").id;

    let toggled = h.coordinator.toggle_task_status(&id).await.unwrap();
    let stored = h.store.find(&id).unwrap();
    assert_eq!(stored, toggled);
    assert_eq!(h.server.tasks()[0].status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_toggle_of_unknown_task_is_not_found() {
    let h = Harness::open();
    h.store.add_task(Task::new("ghost", "Only local"));
    let before = h.store.snapshot();

    let result = h.coordinator.toggle_task_status(&TaskId::from("ghost")).await;
    assert_eq!(result, Err(DomainError::NotFound(TaskId::from("ghost"))));
    assert_eq!(h.store.snapshot(), before);
}

// ========================
// Update
// ========================

#[tokio::test]
async fn test_update_applies_then_reconciles() {
    let h = Harness::gated();
    let original = h.seed("1", "Draft");
    let id = original.id.clone();

    let mut update = Box::pin(h.coordinator.update_task(&id, UpdateTaskInput::title("Final")));
    assert!(poll!(update.as_mut()).is_pending());
    let optimistic = h.store.find(&id).unwrap();
    assert_eq!(optimistic.title, "Final");
    assert!(optimistic.updated_at > original.updated_at);

    h.release(1);
    let updated = update.await.unwrap();
    assert_eq!(h.store.find(&id).unwrap(), updated);
    assert_eq!(updated.title, "Final");
}

#[tokio::test]
async fn test_failed_update_restores_previous_fields() {
    let h = Harness::gated();
    let original = h.seed("1", "Keep").with_description("as is");
    h.store.restore_task(original.clone());

    let input = UpdateTaskInput {
        title: Some("Changed".into()),
        description: Some(Some("changed too".into())),
        status: Some(TaskStatus::Completed),
    };
    let mut update = Box::pin(h.coordinator.update_task(&original.id, input));
    assert!(poll!(update.as_mut()).is_pending());
    assert_eq!(h.store.find(&original.id).unwrap().title, "Changed");

    h.server.inject_failures(1);
    h.release(1);
    assert!(update.await.is_err());
    assert_eq!(h.store.find(&original.id).unwrap(), original);
}

// ========================
// Delete
// ========================

#[tokio::test]
async fn test_delete_removes_immediately() {
    let h = Harness::gated();
    h.seed("1", "One");
    h.seed("2", "Two");

    let id = TaskId::from("1");
    let mut delete = Box::pin(h.coordinator.delete_task(&id));
    assert!(poll!(delete.as_mut()).is_pending());
    assert_eq!(ids(&h.store), vec!["2"]);

    h.release(1);
    delete.await.unwrap();
    assert_eq!(ids(&h.store), vec!["2"]);
    assert_eq!(h.server.tasks().len(), 1);
}

#[tokio::test]
async fn test_failed_delete_restores_task_at_its_position() {
    let h = Harness::gated();
    h.seed("1", "One");
    let middle = h.seed("2", "Two");
    h.seed("3", "Three");

    let mut delete = Box::pin(h.coordinator.delete_task(&middle.id));
    assert!(poll!(delete.as_mut()).is_pending());
    assert_eq!(ids(&h.store), vec!["1", "3"]);

    h.server.inject_failures(1);
    h.release(1);
    assert!(delete.await.is_err());
    assert_eq!(ids(&h.store), vec!["1", "2", "3"]);
    assert_eq!(h.store.find(&middle.id).unwrap(), middle);
}

// ========================
// Threads
// ========================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_creates_on_worker_threads() {
    let h = Harness::open();

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let coordinator = h.coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .create_task(CreateTaskInput::new(format!("Task {}", n)))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task panicked").expect("create succeeds");
    }

    let tasks = h.store.tasks();
    assert_eq!(tasks.len(), 16);
    assert!(tasks.iter().all(|t| !t.id.is_temporary()));
    assert_eq!(h.coordinator.in_flight_count(), 0);
}
