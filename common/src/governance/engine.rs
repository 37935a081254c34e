// Timelock Engine - the scheduling/execution state machine.
//
// Batches are dispatched call-by-call under the engine's own identity,
// then the registry is consulted for readiness, then the terminal state
// is committed. The post-call placement of the readiness check lets a
// batch contain the very call that registers it; that ordering is
// intentional and must not be "fixed" here.

use log::{debug, trace};

use indexmap::IndexMap;

use crate::crypto::{Address, Hash};
use crate::governance::{
    AdministeredTarget, Call, CallBatch, DelayPolicy, EngineAction, Operation, OperationRegistry,
    OperationState, RoleId, RoleTable, RuntimeContext, TimelockError, TimelockResult, ADMIN_ROLE,
    PROPOSER_ROLE,
};
use crate::serializer::Serializer;
use crate::time::TimestampSeconds;

/// Delayed-execution governance controller.
///
/// Owns the role table, the operation registry, the delay policy and
/// the capability dispatch table. All state mutation passes through the
/// methods below; there is no ambient global state.
pub struct Timelock {
    /// The engine's own address, presented as caller on nested calls
    address: Address,
    roles: RoleTable,
    registry: OperationRegistry,
    delay: DelayPolicy,
    targets: IndexMap<Address, Box<dyn AdministeredTarget>>,
}

/// Copy of all mutable state, taken at the start of a batch so a failed
/// unit of work leaves nothing behind.
struct EngineSnapshot {
    roles: RoleTable,
    registry: OperationRegistry,
    delay: DelayPolicy,
    targets: IndexMap<Address, Box<dyn AdministeredTarget>>,
}

impl Timelock {
    /// Deploy a controller.
    ///
    /// The deployer-admin and the engine's own address both receive the
    /// admin role; the given accounts receive the proposer role. The
    /// engine address holds no proposer role.
    pub fn new(
        address: Address,
        admin: Address,
        proposers: &[Address],
        initial_delay: TimestampSeconds,
    ) -> TimelockResult<Self> {
        let mut roles = RoleTable::new();
        roles.grant(ADMIN_ROLE, admin, 0);
        roles.grant(ADMIN_ROLE, address.clone(), 0);
        for proposer in proposers {
            roles.grant(PROPOSER_ROLE, proposer.clone(), 0);
        }

        Ok(Self {
            address,
            roles,
            registry: OperationRegistry::new(),
            delay: DelayPolicy::new(initial_delay)?,
            targets: IndexMap::new(),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Wire an administered capability at deployment time
    pub fn register_target(&mut self, address: Address, target: Box<dyn AdministeredTarget>) {
        debug!("Registering target capability at {}", address);
        self.targets.insert(address, target);
    }

    /// Look up a registered capability
    pub fn target(&self, address: &Address) -> Option<&dyn AdministeredTarget> {
        self.targets.get(address).map(|target| target.as_ref())
    }

    // ===== Queries =====

    pub fn has_role(&self, role: &RoleId, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn get_delay(&self) -> TimestampSeconds {
        self.delay.current()
    }

    pub fn operation_state(&self, id: &Hash) -> OperationState {
        self.registry.state(id)
    }

    pub fn ready_at(&self, id: &Hash) -> Option<TimestampSeconds> {
        self.registry.ready_at(id)
    }

    // ===== Scheduling =====

    /// Schedule a batch given in parallel-array form
    pub fn schedule(
        &mut self,
        ctx: &RuntimeContext,
        targets: &[Address],
        values: &[u64],
        payloads: &[Vec<u8>],
        salt: Hash,
    ) -> TimelockResult<Hash> {
        let batch = CallBatch::new(targets, values, payloads, salt)?;
        self.schedule_batch(ctx, &batch)
    }

    /// Schedule an assembled batch.
    ///
    /// The presented principal must hold the proposer role; the ready
    /// time is fixed from the delay in force right now.
    pub fn schedule_batch(
        &mut self,
        ctx: &RuntimeContext,
        batch: &CallBatch,
    ) -> TimelockResult<Hash> {
        if !self.roles.has_role(&PROPOSER_ROLE, ctx.origin.principal()) {
            return Err(TimelockError::Unauthorized);
        }

        let id = batch.operation_id();
        if self.registry.state(&id) != OperationState::Unknown {
            return Err(TimelockError::AlreadyScheduled);
        }

        let ready_at = ctx.timestamp.saturating_add(self.delay.current());
        self.registry
            .insert(id.clone(), Operation::new(ctx.timestamp, ready_at));

        debug!(
            "Scheduled operation {} ({} calls, ready at {})",
            id,
            batch.calls().len(),
            ready_at
        );
        Ok(id)
    }

    // ===== Execution =====

    /// Execute a batch given in parallel-array form
    pub fn execute(
        &mut self,
        ctx: &RuntimeContext,
        targets: &[Address],
        values: &[u64],
        payloads: &[Vec<u8>],
        salt: Hash,
    ) -> TimelockResult<()> {
        let batch = CallBatch::new(targets, values, payloads, salt)?;
        self.execute_batch(ctx, &batch)
    }

    /// Execute an assembled batch as one unit of work.
    ///
    /// Any caller may invoke this. Every call is dispatched in order
    /// under the engine origin; a failing call rolls the whole unit
    /// back. Readiness of the identifier is evaluated against the
    /// registry only after the calls have run, so a call inside the
    /// batch may itself have scheduled this identifier.
    pub fn execute_batch(&mut self, ctx: &RuntimeContext, batch: &CallBatch) -> TimelockResult<()> {
        let id = batch.operation_id();
        trace!("Executing operation {}", id);

        let snapshot = self.snapshot();
        for (index, call) in batch.calls().iter().enumerate() {
            if let Err(source) = self.dispatch(ctx.timestamp, call) {
                debug!("Call {} of operation {} failed: {}", index, id, source);
                self.restore(snapshot);
                return Err(TimelockError::CallFailed {
                    index,
                    source: Box::new(source),
                });
            }
        }

        match self.registry.state(&id) {
            OperationState::Executed => {
                self.restore(snapshot);
                Err(TimelockError::AlreadyExecuted)
            }
            OperationState::Scheduled if self.registry.is_ready(&id, ctx.timestamp) => {
                self.registry.mark_executed(&id);
                debug!("Executed operation {}", id);
                Ok(())
            }
            _ => {
                self.restore(snapshot);
                Err(TimelockError::NotReady)
            }
        }
    }

    // ===== Role management =====

    /// Add an account to a role.
    ///
    /// Allowed for the engine origin, or for an external principal
    /// holding the admin role. Granting an already-held role is a no-op.
    pub fn grant_role(
        &mut self,
        ctx: &RuntimeContext,
        role: RoleId,
        account: Address,
    ) -> TimelockResult<()> {
        self.check_role_admin(ctx)?;
        if self.roles.grant(role, account.clone(), ctx.timestamp) {
            debug!("Granted role {} to {}", hex::encode(role), account);
        }
        Ok(())
    }

    /// Remove an account from a role. Symmetric to grant.
    pub fn revoke_role(
        &mut self,
        ctx: &RuntimeContext,
        role: RoleId,
        account: Address,
    ) -> TimelockResult<()> {
        self.check_role_admin(ctx)?;
        if self.roles.revoke(&role, &account) {
            debug!("Revoked role {} from {}", hex::encode(role), account);
        }
        Ok(())
    }

    fn check_role_admin(&self, ctx: &RuntimeContext) -> TimelockResult<()> {
        if ctx.origin.is_engine() || self.roles.has_role(&ADMIN_ROLE, ctx.origin.principal()) {
            Ok(())
        } else {
            Err(TimelockError::Unauthorized)
        }
    }

    // ===== Delay policy =====

    /// Replace the minimum delay.
    ///
    /// Only reachable through batch execution: the origin must be the
    /// engine itself, never an external principal.
    pub fn update_delay(
        &mut self,
        ctx: &RuntimeContext,
        new_delay: TimestampSeconds,
    ) -> TimelockResult<()> {
        if !ctx.origin.is_engine() {
            return Err(TimelockError::Unauthorized);
        }
        self.delay.update(new_delay)?;
        debug!("Minimum delay updated to {}", new_delay);
        Ok(())
    }

    // ===== Dispatch =====

    /// Route one batch call to its capability under the engine origin
    fn dispatch(&mut self, now: TimestampSeconds, call: &Call) -> TimelockResult<()> {
        let ctx = RuntimeContext::engine(self.address.clone(), now);

        if call.target == self.address {
            let action = EngineAction::from_bytes(&call.payload)?;
            return self.apply(&ctx, action);
        }

        // Take the target out for the duration of its call so it can be
        // handed the live engine without aliasing the dispatch table.
        let mut target = self
            .targets
            .shift_remove(&call.target)
            .ok_or_else(|| TimelockError::UnknownTarget(call.target.clone()))?;
        let result = target.invoke(self, &ctx, call.value, &call.payload);
        self.targets.insert(call.target.clone(), target);
        result
    }

    /// Apply a decoded governance action issued from inside a batch
    fn apply(&mut self, ctx: &RuntimeContext, action: EngineAction) -> TimelockResult<()> {
        match action {
            EngineAction::GrantRole { role, account } => self.grant_role(ctx, role, account),
            EngineAction::RevokeRole { role, account } => self.revoke_role(ctx, role, account),
            EngineAction::UpdateDelay { delay } => self.update_delay(ctx, delay),
            EngineAction::Schedule {
                targets,
                values,
                payloads,
                salt,
            } => self
                .schedule(ctx, &targets, &values, &payloads, salt)
                .map(|_| ()),
        }
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            roles: self.roles.clone(),
            registry: self.registry.clone(),
            delay: self.delay,
            targets: self.targets.clone(),
        }
    }

    fn restore(&mut self, snapshot: EngineSnapshot) {
        self.roles = snapshot.roles;
        self.registry = snapshot.registry;
        self.delay = snapshot.delay;
        self.targets = snapshot.targets;
    }
}
