//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use taskboard_core::TaskBoard;

/// The wired-up task board, shared with every component
#[derive(Clone)]
pub struct AppContext {
    pub board: TaskBoard,
}

impl AppContext {
    pub fn new(board: TaskBoard) -> Self {
        Self { board }
    }
}

/// Get the app context, panicking if `App` did not provide it
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
