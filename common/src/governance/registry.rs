// Operation Registry - tracks the lifecycle of scheduled batches

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::crypto::Hash;
use crate::time::TimestampSeconds;

/// Lifecycle state of an operation identifier
///
/// Unknown is the default for identifiers the registry has never seen.
/// An operation never regresses from Executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    #[default]
    Unknown,
    Scheduled,
    Executed,
}

impl OperationState {
    /// Get the ID for serialization
    pub fn id(&self) -> u8 {
        match self {
            OperationState::Unknown => 0,
            OperationState::Scheduled => 1,
            OperationState::Executed => 2,
        }
    }

    /// Check if this state represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Executed)
    }
}

/// Registry entry for a scheduled operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Ledger time at which the operation was scheduled
    pub scheduled_at: TimestampSeconds,
    /// Ledger time from which the operation may execute.
    /// Fixed at scheduling time from the delay in force then.
    pub ready_at: TimestampSeconds,
    /// Whether the operation has been executed
    pub executed: bool,
}

impl Operation {
    pub fn new(scheduled_at: TimestampSeconds, ready_at: TimestampSeconds) -> Self {
        Self {
            scheduled_at,
            ready_at,
            executed: false,
        }
    }

    pub fn state(&self) -> OperationState {
        if self.executed {
            OperationState::Executed
        } else {
            OperationState::Scheduled
        }
    }

    /// Ready once the delay has elapsed and it has not yet run
    pub fn is_ready(&self, now: TimestampSeconds) -> bool {
        !self.executed && now >= self.ready_at
    }
}

/// Maps operation identifiers to their lifecycle state.
/// Entries are never deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationRegistry {
    operations: IndexMap<Hash, Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            operations: IndexMap::new(),
        }
    }

    pub fn get(&self, id: &Hash) -> Option<&Operation> {
        self.operations.get(id)
    }

    /// Lifecycle state for an identifier, Unknown if never scheduled
    pub fn state(&self, id: &Hash) -> OperationState {
        self.operations
            .get(id)
            .map(Operation::state)
            .unwrap_or_default()
    }

    pub fn ready_at(&self, id: &Hash) -> Option<TimestampSeconds> {
        self.operations.get(id).map(|op| op.ready_at)
    }

    pub fn is_ready(&self, id: &Hash, now: TimestampSeconds) -> bool {
        self.operations
            .get(id)
            .map(|op| op.is_ready(now))
            .unwrap_or(false)
    }

    /// Record a freshly scheduled operation
    pub fn insert(&mut self, id: Hash, operation: Operation) {
        self.operations.insert(id, operation);
    }

    /// Transition an operation to Executed. Returns false if the
    /// identifier is not present.
    pub fn mark_executed(&mut self, id: &Hash) -> bool {
        match self.operations.get_mut(id) {
            Some(operation) => {
                operation.executed = true;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
