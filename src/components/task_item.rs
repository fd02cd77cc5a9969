//! Task Item Component
//!
//! One task row: status checkbox, inline edit and delete.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::domain::{Task, UpdateTaskInput};
use taskboard_core::validation::validate_update_input;

use super::task_form::{input_value, textarea_value};
use super::DeleteConfirmButton;
use crate::commands;
use crate::context::use_app_context;
use crate::grouping::format_timestamp;

/// Fields that differ from `original`; a blank description clears it
fn edit_input(original: &Task, title: &str, description: &str) -> UpdateTaskInput {
    let mut input = UpdateTaskInput::default();
    let title = title.trim();
    if title != original.title {
        input.title = Some(title.to_string());
    }
    if description.trim() != original.description.as_deref().unwrap_or_default() {
        input = input.with_description(description);
    }
    input
}

/// A single task row
#[component]
pub fn TaskItem(task: Task) -> impl IntoView {
    let ctx = use_app_context();

    let id = task.id.clone();
    let completed = task.is_completed();
    let title = task.title.clone();
    let description = task.description.clone();
    let updated = format_timestamp(&task.updated_at);
    let saved = !task.id.is_temporary();

    // The row is rebuilt on every change, so start from the coordinator's view
    let (busy, set_busy) = signal(ctx.board.coordinator.is_in_flight(&id));
    let (editing, set_editing) = signal(false);
    let (edit_title, set_edit_title) = signal(title.clone());
    let (edit_description, set_edit_description) = signal(description.clone().unwrap_or_default());
    let (edit_error, set_edit_error) = signal::<Option<String>>(None);

    let toggle_board = ctx.board.clone();
    let toggle_id = id.clone();
    let on_toggle = move |_| {
        if busy.get_untracked() {
            return;
        }
        set_busy.set(true);
        let board = toggle_board.clone();
        let id = toggle_id.clone();
        spawn_local(async move {
            let _ = commands::toggle_task(&board, &id).await;
            // The row may already have been rebuilt
            let _ = set_busy.try_set(false);
        });
    };

    let save_board = ctx.board.clone();
    let save_id = id.clone();
    let original = task.clone();
    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let input = edit_input(&original, &edit_title.get(), &edit_description.get());
        if let Err(errors) = validate_update_input(&input) {
            set_edit_error.set(Some(errors.to_string()));
            return;
        }
        set_edit_error.set(None);
        set_editing.set(false);
        if input.is_empty() {
            return;
        }

        let board = save_board.clone();
        let id = save_id.clone();
        spawn_local(async move {
            let _ = commands::update_task(&board, &id, input).await;
        });
    };

    let delete_board = ctx.board.clone();
    let delete_id = id.clone();
    let on_delete = Callback::new(move |_| {
        let board = delete_board.clone();
        let id = delete_id.clone();
        spawn_local(async move {
            let _ = commands::delete_task(&board, &id).await;
        });
    });

    let cancel_title = title.clone();
    let cancel_description = description.clone().unwrap_or_default();

    view! {
        <div class=move || if completed { "task-row completed" } else { "task-row" }>
            <input
                type="checkbox"
                checked=completed
                disabled=move || busy.get() || !saved
                on:change=on_toggle
            />

            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <div class="task-body" on:dblclick=move |_| set_editing.set(true)>
                        <span class="task-title">{title.clone()}</span>
                        {description.clone().filter(|d| !d.is_empty()).map(|d| view! { <p class="task-description">{d}</p> })}
                        <span class="task-updated">{updated.clone()}</span>
                    </div>
                }
            >
                <form class="task-edit-form" on:submit=on_save.clone()>
                    <input
                        type="text"
                        prop:value=move || edit_title.get()
                        on:input=move |ev| set_edit_title.set(input_value(&ev))
                    />
                    <textarea
                        prop:value=move || edit_description.get()
                        on:input=move |ev| set_edit_description.set(textarea_value(&ev))
                    />
                    {move || edit_error.get().map(|msg| view! { <p class="field-error">{msg}</p> })}
                    <button type="submit">"Save"</button>
                    <button
                        type="button"
                        class="cancel-btn"
                        on:click={
                            let cancel_title = cancel_title.clone();
                            let cancel_description = cancel_description.clone();
                            move |_| {
                                set_edit_title.set(cancel_title.clone());
                                set_edit_description.set(cancel_description.clone());
                                set_edit_error.set(None);
                                set_editing.set(false);
                            }
                        }
                    >
                        "Cancel"
                    </button>
                </form>
            </Show>

            <Show when=move || !editing.get()>
                <button class="edit-btn" disabled=!saved on:click=move |_| set_editing.set(true)>
                    "Edit"
                </button>
            </Show>

            <DeleteConfirmButton
                disabled=Signal::derive(move || busy.get() || !saved)
                on_confirm=on_delete
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_input_only_sends_changes() {
        let task = Task::new("1", "Walk").with_description("park");
        assert!(edit_input(&task, " Walk ", "park").is_empty());

        let input = edit_input(&task, "Run", "park");
        assert_eq!(input.title.as_deref(), Some("Run"));
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_edit_input_blank_description_clears() {
        let task = Task::new("1", "Walk").with_description("park");
        assert_eq!(edit_input(&task, "Walk", "   ").description, Some(None));

        // Nothing to clear
        assert!(edit_input(&Task::new("2", "Walk"), "Walk", "").is_empty());
    }
}
