//! Reactive Board Store
//!
//! Mirrors the core `UiStore` into a Leptos `reactive_stores::Store` so
//! components re-render per field instead of on every change.

use leptos::prelude::*;
use reactive_stores::Store;
use taskboard_core::domain::Task;
use taskboard_core::store::{SubscriptionId, UiState, UiStore};

/// Reactive copy of the core UI state
#[derive(Clone, Debug, Default, Store)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub is_loading: bool,
    /// Display text of the last load error
    pub error: Option<String>,
}

impl From<&UiState> for BoardState {
    fn from(state: &UiState) -> Self {
        Self {
            tasks: state.tasks.clone(),
            is_loading: state.is_loading,
            error: state.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Type alias for the store
pub type BoardStore = Store<BoardState>;

/// Get the board store from context
pub fn use_board_store() -> BoardStore {
    expect_context::<BoardStore>()
}

/// Create a `BoardStore` seeded from `ui` and kept in sync with it
pub fn connect_store(ui: &UiStore) -> (BoardStore, SubscriptionId) {
    let store = Store::new(BoardState::from(&ui.snapshot()));
    let subscription = ui.subscribe(move |state| {
        let next = BoardState::from(state);
        if store.is_loading().get_untracked() != next.is_loading {
            *store.is_loading().write() = next.is_loading;
        }
        if store.error().get_untracked() != next.error {
            *store.error().write() = next.error;
        }
        *store.tasks().write() = next.tasks;
    });
    (store, subscription)
}
