//! Taskboard Frontend Entry Point

mod app;
mod commands;
mod components;
mod context;
mod grouping;
mod store;

use app::App;
use leptos::prelude::*;
use taskboard_core::config::AppConfig;

const CONFIG_JSON: &str = include_str!("../config/app.json");

fn main() {
    console_error_panic_hook::set_once();

    let (config, problem) = match AppConfig::from_json(CONFIG_JSON) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    rolling_logger::init_logger("taskboard", config.log_level_filter());
    if let Some(e) = problem {
        log::warn!("[APP] Bad bundled config, using defaults: {}", e);
    }

    mount_to_body(move || view! { <App config=config.clone() /> });
}
