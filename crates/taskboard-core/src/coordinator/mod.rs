//! Optimistic Mutation Coordinator
//!
//! Wraps every write so that the store changes immediately, the backend call
//! runs afterwards, and the outcome either reconciles the store with the
//! authoritative record or restores the pre-mutation state:
//!
//! ```text
//! Applying -> Reconciling -> Done
//!          \-> RollingBack -> Done
//! ```
//!
//! The backend call is the only await point. Everything before it (admission
//! and optimistic apply) and after it (reconcile or rollback) runs without
//! yielding, so a mutation never stays half-applied.

mod ledger;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{
    next_timestamp, CreateTaskInput, DomainResult, Task, TaskId, TaskPatch, UpdateTaskInput,
};
use crate::store::UiStore;
use crate::usecases::TaskUseCases;

use ledger::Ledger;
pub use ledger::{MutationKind, MutationPhase, MutationTicket, PendingMutation};

/// Runs optimistic create/update/delete/toggle against a store and a façade
#[derive(Clone)]
pub struct OptimisticCoordinator {
    store: UiStore,
    use_cases: TaskUseCases,
    ledger: Arc<Mutex<Ledger>>,
}

impl OptimisticCoordinator {
    pub fn new(store: UiStore, use_cases: TaskUseCases) -> Self {
        Self {
            store,
            use_cases,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    pub fn store(&self) -> &UiStore {
        &self.store
    }

    pub fn use_cases(&self) -> &TaskUseCases {
        &self.use_cases
    }

    /// Number of mutations waiting on the backend
    pub fn in_flight_count(&self) -> usize {
        self.ledger.lock().len()
    }

    /// Whether any mutation for `id` is waiting on the backend
    pub fn is_in_flight(&self, id: &TaskId) -> bool {
        self.ledger.lock().contains_identity(id)
    }

    /// Open mutations with their current phase, oldest first
    pub fn pending(&self) -> Vec<PendingMutation> {
        self.ledger.lock().records()
    }

    /// Insert a placeholder with a temporary id, then swap in the created task
    pub async fn create_task(&self, input: CreateTaskInput) -> DomainResult<Task> {
        let placeholder = Task::placeholder(&input);
        let ticket = self.open(MutationKind::Create, placeholder.id.clone(), None, None)?;
        self.store.add_task(placeholder);

        let result = self.use_cases.create_task(input).await;
        self.settle(ticket, result)
    }

    /// Merge `input` locally, then overwrite with the stored result
    pub async fn update_task(&self, id: &TaskId, input: UpdateTaskInput) -> DomainResult<Task> {
        let previous = self.store.find(id);
        let ticket = self.open(MutationKind::Update, id.clone(), previous.clone(), None)?;
        if let Some(previous) = &previous {
            let mut patch = TaskPatch::from(&input);
            patch.updated_at = Some(next_timestamp(previous.updated_at));
            self.store.update_task(id, &patch);
        }

        let result = self.use_cases.update_task(id, &input).await;
        self.settle(ticket, result)
    }

    /// Remove locally; a failed delete puts the task back where it was
    pub async fn delete_task(&self, id: &TaskId) -> DomainResult<()> {
        let previous_index = self.store.position_of(id);
        let previous = self.store.find(id);
        let ticket = self.open(MutationKind::Delete, id.clone(), previous, previous_index)?;
        self.store.delete_task(id);

        match self.use_cases.delete_task(id).await {
            Ok(()) => {
                self.reconcile(ticket, None);
                Ok(())
            }
            Err(e) => {
                self.roll_back(ticket);
                Err(e)
            }
        }
    }

    /// Flip locally; refused while another toggle for `id` is outstanding
    pub async fn toggle_task_status(&self, id: &TaskId) -> DomainResult<Task> {
        let previous = self.store.find(id);
        let ticket = self.open(MutationKind::Toggle, id.clone(), previous, None)?;
        self.store.toggle_task_status(id);

        let result = self.use_cases.toggle_task_status(id).await;
        self.settle(ticket, result)
    }

    fn open(
        &self,
        kind: MutationKind,
        identity: TaskId,
        previous: Option<Task>,
        previous_index: Option<usize>,
    ) -> DomainResult<MutationTicket> {
        let ticket = self
            .ledger
            .lock()
            .open(kind, identity.clone(), previous, previous_index)?;
        log::debug!("[MUTATION] {:?} {} -> {:?}", kind, identity, MutationPhase::Applying);
        Ok(ticket)
    }

    fn settle(&self, ticket: MutationTicket, result: DomainResult<Task>) -> DomainResult<Task> {
        match result {
            Ok(task) => {
                self.reconcile(ticket, Some(&task));
                Ok(task)
            }
            Err(e) => {
                self.roll_back(ticket);
                Err(e)
            }
        }
    }

    fn reconcile(&self, ticket: MutationTicket, authoritative: Option<&Task>) {
        let Some(record) = self.ledger.lock().advance(ticket, MutationPhase::Reconciling) else {
            return;
        };
        log::debug!("[MUTATION] {:?} {} -> {:?}", record.kind, record.identity, MutationPhase::Reconciling);

        match (record.kind, authoritative) {
            (MutationKind::Create, Some(task)) => {
                if !self.store.replace_task(&record.identity, task.clone())
                    && self.store.find(&task.id).is_none()
                {
                    self.store.add_task(task.clone());
                }
            }
            (MutationKind::Update | MutationKind::Toggle, Some(task)) => {
                self.store.update_task(&task.id, &TaskPatch::from(task));
            }
            _ => {}
        }
        self.finish(ticket);
    }

    fn roll_back(&self, ticket: MutationTicket) {
        let Some(record) = self.ledger.lock().advance(ticket, MutationPhase::RollingBack) else {
            return;
        };
        log::debug!("[MUTATION] {:?} {} -> {:?}", record.kind, record.identity, MutationPhase::RollingBack);

        match record.kind {
            MutationKind::Create => {
                self.store.delete_task(&record.identity);
            }
            MutationKind::Update | MutationKind::Toggle => {
                if let Some(previous) = record.previous {
                    self.store.restore_task(previous);
                }
            }
            MutationKind::Delete => {
                if let Some(previous) = record.previous {
                    if self.store.find(&previous.id).is_none() {
                        let index = record.previous_index.unwrap_or(usize::MAX);
                        self.store.insert_task_at(index, previous);
                    }
                }
            }
        }
        self.finish(ticket);
    }

    fn finish(&self, ticket: MutationTicket) {
        if let Some(record) = self.ledger.lock().close(ticket) {
            log::debug!("[MUTATION] {:?} {} -> {:?}", record.kind, record.identity, record.phase);
        }
    }
}
