//! In-flight mutation records
//!
//! Each optimistic mutation is tracked as a tagged record holding what is
//! needed to undo it, keyed by ticket. Toggles additionally hold an
//! admission entry keyed by task id.

use std::collections::{HashMap, HashSet};

use crate::domain::{DomainError, DomainResult, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Toggle,
}

impl MutationKind {
    /// Whether a second mutation of this kind on the same id is refused
    pub fn requires_admission(&self) -> bool {
        matches!(self, MutationKind::Toggle)
    }
}

/// Lifecycle of one mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Optimistic state applied, backend call outstanding
    Applying,
    Reconciling,
    RollingBack,
    /// Record closed; only seen on the value `close` returns
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationTicket(u64);

/// Everything needed to reconcile or undo one mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub ticket: MutationTicket,
    pub kind: MutationKind,
    /// Task id, or the temporary id for a create
    pub identity: TaskId,
    /// Store record before the optimistic apply
    pub previous: Option<Task>,
    /// Position of `previous` in the store (deletes only)
    pub previous_index: Option<usize>,
    pub phase: MutationPhase,
}

#[derive(Debug, Default)]
pub(crate) struct Ledger {
    next_ticket: u64,
    pending: HashMap<MutationTicket, PendingMutation>,
    admitted: HashSet<TaskId>,
}

impl Ledger {
    /// Record a new mutation, refusing a duplicate toggle for the same id
    pub(crate) fn open(
        &mut self,
        kind: MutationKind,
        identity: TaskId,
        previous: Option<Task>,
        previous_index: Option<usize>,
    ) -> DomainResult<MutationTicket> {
        if kind.requires_admission() && !self.admitted.insert(identity.clone()) {
            return Err(DomainError::DuplicateInFlight(identity));
        }

        self.next_ticket += 1;
        let ticket = MutationTicket(self.next_ticket);
        self.pending.insert(
            ticket,
            PendingMutation {
                ticket,
                kind,
                identity,
                previous,
                previous_index,
                phase: MutationPhase::Applying,
            },
        );
        Ok(ticket)
    }

    /// Move an open record to `phase`, returning a copy of it
    pub(crate) fn advance(
        &mut self,
        ticket: MutationTicket,
        phase: MutationPhase,
    ) -> Option<PendingMutation> {
        let record = self.pending.get_mut(&ticket)?;
        record.phase = phase;
        Some(record.clone())
    }

    /// Remove the record and release its admission entry
    pub(crate) fn close(&mut self, ticket: MutationTicket) -> Option<PendingMutation> {
        let mut record = self.pending.remove(&ticket)?;
        if record.kind.requires_admission() {
            self.admitted.remove(&record.identity);
        }
        record.phase = MutationPhase::Done;
        Some(record)
    }

    fn awaiting_backend(&self) -> impl Iterator<Item = &PendingMutation> {
        self.pending
            .values()
            .filter(|record| record.phase == MutationPhase::Applying)
    }

    /// Records still waiting on the backend
    pub(crate) fn len(&self) -> usize {
        self.awaiting_backend().count()
    }

    pub(crate) fn contains_identity(&self, id: &TaskId) -> bool {
        self.awaiting_backend().any(|record| &record.identity == id)
    }

    pub(crate) fn records(&self) -> Vec<PendingMutation> {
        let mut records: Vec<_> = self.pending.values().cloned().collect();
        records.sort_by_key(|record| record.ticket);
        records
    }
}
