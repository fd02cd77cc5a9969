//! Mock API Repository Implementation
//!
//! `TaskRepository` over the in-process mock backend. Converts between wire
//! records (ISO-8601 strings) and domain tasks at this boundary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::traits::TaskRepository;
use crate::domain::{CreateTaskInput, DomainError, DomainResult, Task, TaskId, UpdateTaskInput};
use crate::server::{to_wire_timestamp, MockServer, Request, Response, TaskRecord};

#[derive(Deserialize)]
struct TasksEnvelope {
    tasks: Vec<TaskRecord>,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: TaskRecord,
}

/// Repository talking to a `MockServer`
#[derive(Clone)]
pub struct MockTaskRepository {
    server: Arc<MockServer>,
    base_path: String,
}

impl MockTaskRepository {
    pub fn new(server: Arc<MockServer>) -> Self {
        let base_path = server.tasks_path();
        Self { server, base_path }
    }

    pub fn server(&self) -> &Arc<MockServer> {
        &self.server
    }

    fn task_path(&self, id: &TaskId) -> String {
        format!("{}/{}", self.base_path, id)
    }

    /// Send a request, turning non-2xx answers into domain errors
    async fn send(&self, request: Request, id: Option<&TaskId>) -> DomainResult<Response> {
        let response = self.server.handle(request).await;
        if response.is_success() {
            return Ok(response);
        }
        Err(match (response.status, id) {
            (404, Some(id)) => DomainError::NotFound(id.clone()),
            (status, _) => DomainError::backend(
                response
                    .error_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            ),
        })
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> DomainResult<T> {
    serde_json::from_value(body).map_err(|e| DomainError::backend(format!("invalid response: {}", e)))
}

fn encode<T: serde::Serialize>(input: &T) -> DomainResult<Value> {
    serde_json::to_value(input).map_err(|e| DomainError::backend(format!("invalid request: {}", e)))
}

fn decode_task(body: Value) -> DomainResult<Task> {
    let envelope: TaskEnvelope = decode(body)?;
    Task::try_from(envelope.task)
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn find_all(&self) -> DomainResult<Vec<Task>> {
        let response = self.send(Request::get(self.base_path.clone()), None).await?;
        let envelope: TasksEnvelope = decode(response.body)?;
        envelope.tasks.into_iter().map(Task::try_from).collect()
    }

    async fn find_by_id(&self, id: &TaskId) -> DomainResult<Option<Task>> {
        match self.send(Request::get(self.task_path(id)), Some(id)).await {
            Ok(response) => decode_task(response.body).map(Some),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, input: &CreateTaskInput) -> DomainResult<Task> {
        let now = to_wire_timestamp(Utc::now());
        let mut body = encode(input)?;
        body["createdAt"] = Value::String(now.clone());
        body["updatedAt"] = Value::String(now);

        let response = self.send(Request::post(self.base_path.clone(), body), None).await?;
        decode_task(response.body)
    }

    async fn update(&self, id: &TaskId, input: &UpdateTaskInput) -> DomainResult<Task> {
        let mut body = encode(input)?;
        body["updatedAt"] = Value::String(to_wire_timestamp(Utc::now()));

        let response = self
            .send(Request::patch(self.task_path(id), body), Some(id))
            .await?;
        decode_task(response.body)
    }

    async fn delete(&self, id: &TaskId) -> DomainResult<()> {
        self.send(Request::delete(self.task_path(id)), Some(id)).await?;
        Ok(())
    }
}
