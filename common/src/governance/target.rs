use std::any::Any;

use crate::governance::{RuntimeContext, Timelock, TimelockResult};

/// Capability the engine can dispatch batch calls to.
///
/// Implementors receive the live engine so that nested governance calls
/// made during a batch observe and mutate the in-flight state; the
/// context they are handed carries the engine's identity as the
/// presented caller. A target is absent from the dispatch table while
/// its own invoke runs, so it cannot re-enter itself within one call.
pub trait AdministeredTarget {
    /// Dispatch an encoded action with the presented caller identity
    fn invoke(
        &mut self,
        engine: &mut Timelock,
        ctx: &RuntimeContext,
        value: u64,
        payload: &[u8],
    ) -> TimelockResult<()>;

    /// Clone into a boxed trait object, used for execution snapshots
    fn clone_box(&self) -> Box<dyn AdministeredTarget>;

    /// Downcasting hook for deployment and test harnesses
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn AdministeredTarget> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
