//! Grouping Utilities
//!
//! Helper functions for list rendering.

use chrono::{DateTime, Utc};
use taskboard_core::domain::{Task, TaskStatus};

/// Tasks split by status, each group in store order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskGroups {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskGroups {
    pub fn total(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    /// e.g. "3 tasks, 1 completed"
    pub fn summary(&self) -> String {
        let total = self.total();
        let noun = if total == 1 { "task" } else { "tasks" };
        format!("{} {}, {} completed", total, noun, self.completed.len())
    }
}

pub fn group_by_status(tasks: &[Task]) -> TaskGroups {
    let mut groups = TaskGroups::default();
    for task in tasks {
        match task.status {
            TaskStatus::Pending => groups.pending.push(task.clone()),
            TaskStatus::Completed => groups.completed.push(task.clone()),
        }
    }
    groups
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
