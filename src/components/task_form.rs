//! Task Form Component
//!
//! Form for creating new tasks with inline validation messages.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskboard_core::domain::CreateTaskInput;
use taskboard_core::validation::{validate_create_input, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use wasm_bindgen::JsCast;

use crate::commands;
use crate::context::use_app_context;

pub(super) fn input_value(ev: &web_sys::Event) -> String {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default()
}

pub(super) fn textarea_value(ev: &web_sys::Event) -> String {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        .map(|area| area.value())
        .unwrap_or_default()
}

/// Form for creating a task
#[component]
pub fn TaskForm() -> impl IntoView {
    let ctx = use_app_context();

    let (title, set_title) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (title_error, set_title_error) = signal::<Option<String>>(None);
    let (description_error, set_description_error) = signal::<Option<String>>(None);

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = title.get();
        let details = description.get();

        let mut input = CreateTaskInput::new(text.trim());
        if !details.trim().is_empty() {
            input = input.with_description(details.trim());
        }
        if let Err(errors) = validate_create_input(&input) {
            set_title_error.set(errors.message_for("title").map(str::to_string));
            set_description_error.set(errors.message_for("description").map(str::to_string));
            return;
        }
        set_title_error.set(None);
        set_description_error.set(None);

        // The placeholder shows up right away, so the form clears right away too
        set_title.set(String::new());
        set_description.set(String::new());

        let board = ctx.board.clone();
        spawn_local(async move {
            let _ = commands::create_task(&board, &text, Some(&details)).await;
        });
    };

    view! {
        <form class="task-form" on:submit=create_task>
            <div class="task-form-row">
                <input
                    type="text"
                    placeholder="What needs doing?"
                    maxlength=TITLE_MAX_CHARS.to_string()
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(input_value(&ev))
                />
                <button type="submit">"Add"</button>
            </div>
            {move || title_error.get().map(|msg| view! { <p class="field-error">{msg}</p> })}

            <textarea
                class="task-form-description"
                placeholder="Description (optional)"
                maxlength=DESCRIPTION_MAX_CHARS.to_string()
                prop:value=move || description.get()
                on:input=move |ev| set_description.set(textarea_value(&ev))
            />
            {move || description_error.get().map(|msg| view! { <p class="field-error">{msg}</p> })}
        </form>
    }
}
