//! Mock Backend
//!
//! In-memory stand-in for the task REST API. Keeps its own collection of
//! wire records, independent of the UI store.
//!
//! Routes (under `/{namespace}`):
//! - `GET    /tasks`      -> `200 { tasks }`
//! - `GET    /tasks/:id`  -> `200 { task }` | `404`
//! - `POST   /tasks`      -> `201 { task }` | `400`
//! - `PATCH  /tasks/:id`  -> `200 { task }` | `404` | `400`
//! - `DELETE /tasks/:id`  -> `204`

mod http;
mod record;

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ServerConfig;
use crate::domain::{deserialize_nullable, TaskStatus};
use crate::timer;

pub use http::{Method, Request, Response};
pub use record::{parse_wire_timestamp, to_wire_timestamp, TaskRecord};

const SEED_TASKS: &[(&str, &str)] = &[
    (
        "Welcome to your task app",
        "This is an example task. You can edit or delete it.",
    ),
    (
        "Finish the project",
        "Wrap up the task app with a clean architecture",
    ),
];

#[derive(Debug, Default, Deserialize)]
struct CreateBody {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct PatchBody {
    title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    description: Option<Option<String>>,
    status: Option<TaskStatus>,
}

#[derive(Debug, Default)]
struct ServerState {
    tasks: Vec<TaskRecord>,
    next_id: u64,
    pending_failures: u32,
    request_count: u64,
}

impl ServerState {
    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn allocate_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }

    fn insert(&mut self, record: TaskRecord) {
        if let Ok(numeric) = record.id.parse::<u64>() {
            self.next_id = self.next_id.max(numeric + 1);
        }
        self.tasks.push(record);
    }
}

/// In-process task API
pub struct MockServer {
    config: ServerConfig,
    state: Mutex<ServerState>,
}

impl MockServer {
    pub fn new(config: ServerConfig) -> Self {
        let server = Self {
            state: Mutex::new(ServerState {
                next_id: 1,
                ..Default::default()
            }),
            config,
        };
        if server.config.seed {
            server.seed();
        }
        server
    }

    fn seed(&self) {
        let now = to_wire_timestamp(Utc::now());
        let mut state = self.state.lock();
        for (index, (title, description)) in SEED_TASKS.iter().enumerate() {
            state.insert(TaskRecord {
                id: (index + 1).to_string(),
                title: title.to_string(),
                description: Some(description.to_string()),
                status: TaskStatus::Pending,
                created_at: now.clone(),
                updated_at: now.clone(),
            });
        }
        log::debug!("[SERVER] Seeded {} tasks", SEED_TASKS.len());
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Base path of the task collection, e.g. `/api/tasks`
    pub fn tasks_path(&self) -> String {
        format!("/{}/tasks", self.config.namespace.trim_matches('/'))
    }

    /// Put a record directly into the fixture
    pub fn insert(&self, record: TaskRecord) {
        self.state.lock().insert(record);
    }

    /// Snapshot of the server-side collection
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.state.lock().tasks.clone()
    }

    /// Make the next `count` requests answer `500`
    pub fn inject_failures(&self, count: u32) {
        self.state.lock().pending_failures += count;
    }

    /// Injected failures not yet consumed
    pub fn pending_failures(&self) -> u32 {
        self.state.lock().pending_failures
    }

    /// Number of requests handled so far
    pub fn request_count(&self) -> u64 {
        self.state.lock().request_count
    }

    /// Handle one request after the configured latency
    pub async fn handle(&self, request: Request) -> Response {
        if self.config.latency_ms > 0 {
            timer::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        let mut state = self.state.lock();
        state.request_count += 1;

        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            log::debug!("[SERVER] {} {} -> injected failure", request.method.as_str(), request.path);
            return Response::error(500, "Injected failure");
        }

        let response = self.route(&mut state, &request);
        log::debug!(
            "[SERVER] {} {} -> {}",
            request.method.as_str(),
            request.path,
            response.status
        );
        response
    }

    fn route(&self, state: &mut ServerState, request: &Request) -> Response {
        let namespace = self.config.namespace.trim_matches('/');
        let path = request.path.trim_end_matches('/');
        let rest = match path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(namespace))
            .and_then(|p| p.strip_prefix('/'))
        {
            Some(rest) => rest,
            None => return Response::error(404, "Route not found"),
        };

        let segments: Vec<&str> = rest.split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Get, ["tasks"]) => list_tasks(state),
            (Method::Post, ["tasks"]) => create_task(state, request.body.as_ref()),
            (Method::Get, ["tasks", id]) => find_task(state, id),
            (Method::Patch, ["tasks", id]) => update_task(state, id, request.body.as_ref()),
            (Method::Delete, ["tasks", id]) => delete_task(state, id),
            (_, ["tasks"]) | (_, ["tasks", _]) => Response::error(405, "Method not allowed"),
            _ => Response::error(404, "Route not found"),
        }
    }
}

fn parse_body<T: for<'de> Deserialize<'de> + Default>(body: Option<&Value>) -> Result<T, Response> {
    match body {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|_| Response::error(400, "Invalid request body")),
    }
}

fn list_tasks(state: &ServerState) -> Response {
    Response::json(200, json!({ "tasks": state.tasks }))
}

fn find_task(state: &ServerState, id: &str) -> Response {
    match state.position(id) {
        Some(index) => Response::json(200, json!({ "task": state.tasks[index] })),
        None => Response::error(404, "Task not found"),
    }
}

fn create_task(state: &mut ServerState, body: Option<&Value>) -> Response {
    let body: CreateBody = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let title = match body.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Response::error(400, "Title is required"),
    };

    let now = to_wire_timestamp(Utc::now());
    let record = TaskRecord {
        id: state.allocate_id(),
        title,
        description: body.description,
        status: body.status.unwrap_or_default(),
        created_at: now.clone(),
        updated_at: now,
    };
    state.tasks.push(record.clone());
    Response::json(201, json!({ "task": record }))
}

fn update_task(state: &mut ServerState, id: &str, body: Option<&Value>) -> Response {
    let body: PatchBody = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let Some(index) = state.position(id) else {
        return Response::error(404, "Task not found");
    };
    if matches!(&body.title, Some(title) if title.trim().is_empty()) {
        return Response::error(400, "Title is required");
    }

    let record = &mut state.tasks[index];
    if let Some(title) = body.title {
        record.title = title;
    }
    if let Some(description) = body.description {
        record.description = description.filter(|d| !d.trim().is_empty());
    }
    if let Some(status) = body.status {
        record.status = status;
    }
    record.updated_at = to_wire_timestamp(Utc::now());
    Response::json(200, json!({ "task": record }))
}

fn delete_task(state: &mut ServerState, id: &str) -> Response {
    state.tasks.retain(|t| t.id != id);
    Response::no_content()
}
