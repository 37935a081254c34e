// Delayed-Execution Governance Controller
// This module implements the timelock controller that gates privileged
// operations behind a proposer role and a mandatory minimum delay.
//
// Components:
// - roles: role identifiers and membership table (admin, proposer)
// - call: operation batches and their deterministic identifiers
// - registry: per-identifier lifecycle state (unknown/scheduled/executed)
// - delay: the bounded minimum-delay policy
// - action: payload codec for calls addressed to the controller itself
// - target: dispatch seam for administered capabilities
// - engine: the scheduling/execution state machine
//
// Execution model: batches run as a single unit of work. Every call is
// dispatched under the controller's own identity, and the readiness of
// the batch identifier is evaluated against the registry as it stands
// once all calls have run. A batch may therefore contain the very call
// that registers it. This ordering is intentional; do not reorder the
// checks.

mod action;
mod call;
mod context;
mod delay;
mod engine;
mod error;
#[cfg(test)]
mod integration_tests;
mod registry;
mod roles;
mod target;

pub use action::*;
pub use call::*;
pub use context::*;
pub use delay::*;
pub use engine::*;
pub use error::*;
pub use registry::*;
pub use roles::*;
pub use target::*;
