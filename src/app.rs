//! Taskboard Frontend App
//!
//! Main application component: form on top, grouped task list below.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::config::AppConfig;
use taskboard_core::TaskBoard;

use crate::commands;
use crate::components::{TaskForm, TaskList};
use crate::context::AppContext;
use crate::store::{connect_store, BoardStateStoreFields};

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let board = TaskBoard::new(config.server);
    let (store, subscription) = connect_store(&board.store);

    // Provide context to all children
    provide_context(AppContext::new(board.clone()));
    provide_context(store);

    let ui = board.store.clone();
    on_cleanup(move || {
        ui.unsubscribe(subscription);
    });

    // Hydrate once on mount; the loader ignores repeat calls
    let retry_board = board.clone();
    let load_board = board.clone();
    Effect::new(move |_| {
        let board = load_board.clone();
        spawn_local(async move {
            let _ = commands::load_tasks(&board).await;
        });
    });

    // Demo control: the next backend call fails and the UI rolls back
    let fail_board = board.clone();
    let queued_board = board.clone();
    let (clicks, set_clicks) = signal(0u32);
    let fail_next = move |_| {
        commands::fail_next_request(&fail_board);
        set_clicks.update(|n| *n += 1);
    };
    // Re-read after every click and every store change
    let queued_failures = Signal::derive(move || {
        clicks.track();
        store.tasks().track();
        queued_board.server.pending_failures()
    });

    let retry = move |_| {
        let board = retry_board.clone();
        spawn_local(async move {
            let _ = commands::load_tasks(&board).await;
        });
    };

    view! {
        <main class="main-content">
            <h1>"Taskboard"</h1>

            <div class="demo-controls">
                <button class="fail-next-btn" on:click=fail_next>"Fail next request"</button>
                {move || {
                    let queued = queued_failures.get();
                    (queued != 0).then(|| view! { <span class="queued-failures">{format!("{} queued", queued)}</span> })
                }}
            </div>

            <TaskForm />

            <Show when=move || store.is_loading().get()>
                <div class="loading-spinner">"Loading tasks..."</div>
            </Show>

            {move || store.error().get().map(|message| view! {
                <div class="error-card">
                    <p>{message}</p>
                    <button class="retry-btn" on:click=retry.clone()>"Retry"</button>
                </div>
            })}

            <TaskList />
        </main>
    }
}
