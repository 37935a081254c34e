use serde::{Deserialize, Serialize};

use crate::config::MAX_DELAY;
use crate::governance::{TimelockError, TimelockResult};
use crate::time::TimestampSeconds;

/// Minimum-delay policy for scheduled operations
///
/// The current delay is bounded by MAX_DELAY and only mutable through
/// the engine itself; the engine enforces the caller-context rule, this
/// type enforces the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayPolicy {
    current: TimestampSeconds,
}

impl DelayPolicy {
    pub fn new(initial: TimestampSeconds) -> TimelockResult<Self> {
        let mut policy = Self { current: 0 };
        policy.update(initial)?;
        Ok(policy)
    }

    pub fn current(&self) -> TimestampSeconds {
        self.current
    }

    pub fn update(&mut self, new_delay: TimestampSeconds) -> TimelockResult<()> {
        if new_delay > MAX_DELAY {
            return Err(TimelockError::InvalidDelay {
                delay: new_delay,
                max: MAX_DELAY,
            });
        }
        self.current = new_delay;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_within_bounds() {
        let mut policy = DelayPolicy::new(3600).unwrap();
        assert_eq!(policy.current(), 3600);

        policy.update(0).unwrap();
        assert_eq!(policy.current(), 0);

        policy.update(MAX_DELAY).unwrap();
        assert_eq!(policy.current(), MAX_DELAY);
    }

    #[test]
    fn test_update_above_maximum() {
        let mut policy = DelayPolicy::new(3600).unwrap();
        let result = policy.update(MAX_DELAY + 1);
        assert_eq!(
            result,
            Err(TimelockError::InvalidDelay {
                delay: MAX_DELAY + 1,
                max: MAX_DELAY,
            })
        );
        // Rejected update leaves the policy untouched
        assert_eq!(policy.current(), 3600);
    }

    #[test]
    fn test_new_above_maximum() {
        assert!(DelayPolicy::new(MAX_DELAY + 1).is_err());
    }
}
