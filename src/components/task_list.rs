//! Task List Component
//!
//! Pending tasks first, then completed ones, each in store order.

use leptos::prelude::*;
use taskboard_core::domain::Task;

use super::TaskItem;
use crate::grouping::group_by_status;
use crate::store::{use_board_store, BoardStateStoreFields};

#[component]
fn TaskSection(#[prop(into)] heading: String, tasks: Signal<Vec<Task>>) -> impl IntoView {
    view! {
        <Show when=move || !tasks.get().is_empty()>
            <section class="task-section">
                <h2>{heading.clone()}</h2>
                <For
                    each=move || tasks.get()
                    // Every mutable field, so an edit re-renders the row
                    key=|task| {
                        (
                            task.id.clone(),
                            task.title.clone(),
                            task.description.clone(),
                            task.status,
                            task.updated_at,
                        )
                    }
                    children=move |task| view! { <TaskItem task=task /> }
                />
            </section>
        </Show>
    }
}

#[component]
pub fn TaskList() -> impl IntoView {
    let store = use_board_store();

    let groups = Memo::new(move |_| group_by_status(&store.tasks().get()));
    let pending = Signal::derive(move || groups.get().pending);
    let completed = Signal::derive(move || groups.get().completed);

    view! {
        <div class="task-list">
            <Show
                when=move || !groups.get().is_empty()
                fallback=move || view! {
                    <Show when=move || !store.is_loading().get()>
                        <p class="empty-state">"No tasks yet. Add one above."</p>
                    </Show>
                }
            >
                <p class="task-summary">{move || groups.get().summary()}</p>
            </Show>

            <TaskSection heading="Pending" tasks=pending />
            <TaskSection heading="Completed" tasks=completed />
        </div>
    }
}
