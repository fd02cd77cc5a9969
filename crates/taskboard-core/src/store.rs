//! UI State Store
//!
//! The best-known view of all tasks plus loading/error flags. `UiStore` is a
//! cheap handle; clones share the same state. It is built once by the app
//! and passed down through context.
//!
//! Every mutating operation reports whether anything changed. Operations on
//! an absent id change nothing: the version stays the same and no listener
//! is called.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::domain::{DomainError, Entity, Task, TaskId, TaskPatch};

pub type SubscriptionId = u64;

type Listener = Arc<dyn Fn(&UiState) + Send + Sync>;

/// Store contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Tasks in insertion order
    pub tasks: Vec<Task>,
    pub is_loading: bool,
    pub error: Option<DomainError>,
}

impl UiState {
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn position_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}

struct Inner {
    state: RwLock<UiState>,
    version: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
    /// Newest version handed to listeners; held while they run
    delivered: ReentrantMutex<Cell<u64>>,
}

/// Shared handle to the UI state
#[derive(Clone)]
pub struct UiStore {
    inner: Arc<Inner>,
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiStore")
            .field("version", &self.version())
            .field("state", &*self.inner.state.read())
            .finish()
    }
}

impl UiStore {
    pub fn new() -> Self {
        Self::with_state(UiState::default())
    }

    pub fn with_state(state: UiState) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                version: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
                delivered: ReentrantMutex::new(Cell::new(0)),
            }),
        }
    }

    // ========================
    // Reads
    // ========================

    pub fn snapshot(&self) -> UiState {
        self.inner.state.read().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.inner.state.read().tasks.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, id: &TaskId) -> Option<Task> {
        self.inner.state.read().find(id).cloned()
    }

    pub fn position_of(&self, id: &TaskId) -> Option<usize> {
        self.inner.state.read().position_of(id)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read().is_loading
    }

    pub fn error(&self) -> Option<DomainError> {
        self.inner.state.read().error.clone()
    }

    /// Bumped once per effective mutation
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    // ========================
    // Mutations
    // ========================

    /// Replace the whole collection
    pub fn set_tasks(&self, tasks: Vec<Task>) {
        self.mutate(|state| {
            state.tasks = tasks;
            true
        });
    }

    /// Append a task. Ids are not checked for collisions.
    pub fn add_task(&self, task: Task) {
        self.mutate(|state| {
            state.tasks.push(task);
            true
        });
    }

    /// Insert at `index`, clamped to the end of the collection
    pub fn insert_task_at(&self, index: usize, task: Task) {
        self.mutate(|state| {
            let index = index.min(state.tasks.len());
            state.tasks.insert(index, task);
            true
        });
    }

    /// Merge `patch` into the matching task
    pub fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> bool {
        self.mutate(|state| match state.tasks.iter_mut().find(|task| task.id() == id) {
            Some(task) => {
                let before = task.clone();
                task.apply(patch);
                *task != before
            }
            None => false,
        })
    }

    /// Replace the matching task in place, keeping its position
    pub fn replace_task(&self, id: &TaskId, replacement: Task) -> bool {
        self.mutate(|state| match state.tasks.iter_mut().find(|task| task.id() == id) {
            Some(task) if *task != replacement => {
                *task = replacement;
                true
            }
            _ => false,
        })
    }

    /// Overwrite the stored task carrying the same id with `previous`
    pub fn restore_task(&self, previous: Task) -> bool {
        let id = previous.id.clone();
        self.replace_task(&id, previous)
    }

    pub fn delete_task(&self, id: &TaskId) -> bool {
        self.mutate(|state| {
            let before = state.tasks.len();
            state.tasks.retain(|task| task.id() != id);
            state.tasks.len() != before
        })
    }

    /// Flip pending/completed and refresh `updated_at`
    pub fn toggle_task_status(&self, id: &TaskId) -> bool {
        self.mutate(|state| match state.tasks.iter_mut().find(|task| task.id() == id) {
            Some(task) => {
                task.toggle();
                true
            }
            None => false,
        })
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate(|state| {
            let changed = state.is_loading != loading;
            state.is_loading = loading;
            changed
        });
    }

    pub fn set_error(&self, error: Option<DomainError>) {
        self.mutate(|state| {
            let changed = state.error != error;
            state.error = error;
            changed
        });
    }

    // ========================
    // Subscriptions
    // ========================

    /// Call `listener` with a snapshot after every effective mutation
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&UiState) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::SeqCst);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sub, _)| *sub != id);
        listeners.len() != before
    }

    /// Run `f` under the write lock; bump and notify only if it reports a change
    fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut UiState) -> bool,
    {
        let (version, listeners, snapshot) = {
            let mut state = self.inner.state.write();
            if !f(&mut state) {
                return false;
            }
            let version = self.inner.version.fetch_add(1, Ordering::SeqCst) + 1;
            let listeners: Vec<Listener> = self
                .inner
                .listeners
                .lock()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            // Taken under the write lock so it matches `version`
            let snapshot = (!listeners.is_empty()).then(|| state.clone());
            (version, listeners, snapshot)
        };
        if let Some(snapshot) = snapshot {
            self.notify(version, &listeners, &snapshot);
        }
        true
    }

    /// Hand `snapshot` to listeners unless a newer one already went out.
    ///
    /// A listener that mutates the store re-enters here on the same thread;
    /// the outer call then stops instead of delivering its older snapshot.
    fn notify(&self, version: u64, listeners: &[Listener], snapshot: &UiState) {
        let delivered = self.inner.delivered.lock();
        if version <= delivered.get() {
            return;
        }
        delivered.set(version);
        for listener in listeners {
            if delivered.get() != version {
                break;
            }
            listener(snapshot);
        }
    }
}
