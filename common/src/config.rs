use crate::time::TimestampSeconds;

// ===== Governance timing rules =====

// Hard upper bound on the minimum execution delay.
// No delay update may ever exceed this, not even one issued by the
// controller itself.
pub const MAX_DELAY: TimestampSeconds = 14 * 24 * 60 * 60; // 14 days

// Delay applied to freshly deployed controllers when no explicit
// value is provided by the deployment wiring.
pub const DEFAULT_MIN_DELAY: TimestampSeconds = 60 * 60; // 1 hour

// ===== Batch rules =====

// Maximum number of calls a single operation batch may carry.
// Batches are dispatched call-by-call inside one unit of work, so this
// also bounds the depth of a single execution.
pub const MAX_BATCH_SIZE: usize = 255;
