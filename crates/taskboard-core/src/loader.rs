//! Initial Load Sequencing
//!
//! Copies the backend collection into the store exactly once. After that
//! the store is the only source of truth; nothing fetched later may
//! overwrite it, or in-flight optimistic edits would be lost.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::DomainResult;
use crate::store::UiStore;
use crate::usecases::TaskUseCases;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Hydrated,
}

/// What a call to `hydrate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Fetched and stored this many tasks
    Hydrated(usize),
    /// Another call is fetching right now
    InProgress,
    /// The store was hydrated earlier; nothing fetched
    AlreadyHydrated,
}

#[derive(Clone)]
pub struct InitialLoader {
    store: UiStore,
    use_cases: TaskUseCases,
    state: Arc<Mutex<LoadState>>,
}

impl InitialLoader {
    pub fn new(store: UiStore, use_cases: TaskUseCases) -> Self {
        Self {
            store,
            use_cases,
            state: Arc::new(Mutex::new(LoadState::Idle)),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        *self.state.lock() == LoadState::Hydrated
    }

    /// Fetch all tasks into the store unless that already happened.
    ///
    /// A failed fetch records the error on the store and leaves the loader
    /// idle, so calling again retries.
    pub async fn hydrate(&self) -> DomainResult<HydrateOutcome> {
        {
            let mut state = self.state.lock();
            let current = *state;
            match current {
                LoadState::Hydrated => return Ok(HydrateOutcome::AlreadyHydrated),
                LoadState::Loading => return Ok(HydrateOutcome::InProgress),
                LoadState::Idle => *state = LoadState::Loading,
            }
        }
        self.store.set_loading(true);

        match self.use_cases.get_all_tasks().await {
            Ok(tasks) => {
                let count = tasks.len();
                self.store.set_tasks(tasks);
                self.store.set_loading(false);
                self.store.set_error(None);
                *self.state.lock() = LoadState::Hydrated;
                log::info!("[LOADER] Hydrated store with {} tasks", count);
                Ok(HydrateOutcome::Hydrated(count))
            }
            Err(e) => {
                self.store.set_error(Some(e.clone()));
                self.store.set_loading(false);
                *self.state.lock() = LoadState::Idle;
                Err(e)
            }
        }
    }
}
