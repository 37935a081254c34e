use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::time::TimestampSeconds;

/// Identity under which a call enters the controller.
///
/// The distinction between an external principal and a nested call the
/// engine issues while executing a batch is an explicit tag, never an
/// ambient sender variable. Several entry points are gated on this tag
/// rather than on role membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOrigin {
    /// A signed external principal
    Account(Address),
    /// A nested call dispatched by the engine during batch execution.
    /// Carries the engine's own address as the presented principal.
    Engine(Address),
}

impl CallOrigin {
    /// The principal this origin presents to authorization checks
    pub fn principal(&self) -> &Address {
        match self {
            CallOrigin::Account(address) => address,
            CallOrigin::Engine(address) => address,
        }
    }

    /// True when the call was issued by the engine itself
    pub fn is_engine(&self) -> bool {
        matches!(self, CallOrigin::Engine(_))
    }
}

/// Runtime context providing caller identity and ledger time
///
/// The timestamp comes from the surrounding ledger; the controller never
/// reads the system clock for a state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub origin: CallOrigin,
    pub timestamp: TimestampSeconds,
}

impl RuntimeContext {
    /// Create a new runtime context
    pub fn new(origin: CallOrigin, timestamp: TimestampSeconds) -> Self {
        Self { origin, timestamp }
    }

    /// Context for a signed external caller
    pub fn account(caller: Address, timestamp: TimestampSeconds) -> Self {
        Self::new(CallOrigin::Account(caller), timestamp)
    }

    /// Context the engine presents when dispatching nested calls
    pub fn engine(engine: Address, timestamp: TimestampSeconds) -> Self {
        Self::new(CallOrigin::Engine(engine), timestamp)
    }
}
