// Operation batches and their deterministic identifiers.
//
// A batch is fully materialized by the caller before submission; the
// controller never stores batch contents, only the lifecycle state
// keyed by the identifier below. Proposers predict the identifier of a
// batch before scheduling it, so the computation must be reproducible
// from the public fields alone.

use serde::{Deserialize, Serialize};

use crate::config::MAX_BATCH_SIZE;
use crate::crypto::{Address, Hash};
use crate::governance::{TimelockError, TimelockResult};
use crate::serializer::{Reader, ReaderError, Serializer, Writer};

/// Domain tag for operation identifiers
const OPERATION_ID_DOMAIN: &[u8] = b"TIMELOCK_OPERATION:";

/// One privileged instruction inside a batch
///
/// Immutable once part of a submitted batch. The payload is opaque to
/// the engine until dispatch, when the target capability decodes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Capability the call is addressed to
    pub target: Address,
    /// Native value forwarded with the call
    pub value: u64,
    /// Encoded action for the target to decode
    pub payload: Vec<u8>,
}

impl Call {
    pub fn new(target: Address, value: u64, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }
}

impl Serializer for Call {
    fn write(&self, writer: &mut Writer) {
        self.target.write(writer);
        self.value.write(writer);
        self.payload.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            target: Address::read(reader)?,
            value: u64::read(reader)?,
            payload: Vec::read(reader)?,
        })
    }

    fn size(&self) -> usize {
        self.target.size() + self.value.size() + self.payload.size()
    }
}

/// Ordered sequence of calls plus a salt, executed atomically
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBatch {
    calls: Vec<Call>,
    salt: Hash,
}

impl CallBatch {
    /// Build a batch from the parallel-array entry-point form.
    ///
    /// All three arrays must have equal length, and the batch must hold
    /// between 1 and MAX_BATCH_SIZE calls.
    pub fn new(
        targets: &[Address],
        values: &[u64],
        payloads: &[Vec<u8>],
        salt: Hash,
    ) -> TimelockResult<Self> {
        if targets.len() != values.len() || targets.len() != payloads.len() {
            return Err(TimelockError::MalformedBatch);
        }

        let calls = targets
            .iter()
            .zip(values.iter())
            .zip(payloads.iter())
            .map(|((target, value), payload)| {
                Call::new(target.clone(), *value, payload.clone())
            })
            .collect();

        Self::from_calls(calls, salt)
    }

    /// Build a batch from already-assembled calls
    pub fn from_calls(calls: Vec<Call>, salt: Hash) -> TimelockResult<Self> {
        if calls.is_empty() {
            return Err(TimelockError::EmptyBatch);
        }

        if calls.len() > MAX_BATCH_SIZE {
            return Err(TimelockError::BatchTooLarge {
                len: calls.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        Ok(Self { calls, salt })
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn salt(&self) -> &Hash {
        &self.salt
    }

    /// Compute the deterministic identifier keying this batch's
    /// lifecycle state.
    ///
    /// The digest covers the call count, every call's target, value and
    /// length-prefixed payload in order, and the salt. Reordering two
    /// calls changes the identifier.
    pub fn operation_id(&self) -> Hash {
        use blake3::Hasher;
        let mut hasher = Hasher::new();
        hasher.update(OPERATION_ID_DOMAIN);
        hasher.update(&(self.calls.len() as u64).to_be_bytes());
        for call in &self.calls {
            hasher.update(call.target.as_bytes());
            hasher.update(&call.value.to_be_bytes());
            hasher.update(&(call.payload.len() as u64).to_be_bytes());
            hasher.update(&call.payload);
        }
        hasher.update(self.salt.as_bytes());
        let result = hasher.finalize();
        Hash::new(*result.as_bytes())
    }
}

impl Serializer for CallBatch {
    fn write(&self, writer: &mut Writer) {
        self.calls.write(writer);
        self.salt.write(writer);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            calls: Vec::read(reader)?,
            salt: Hash::read(reader)?,
        })
    }

    fn size(&self) -> usize {
        self.calls.size() + self.salt.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address(seed: u8) -> Address {
        let mut bytes = [0u8; 32];
        bytes[0] = seed;
        Address::new(bytes)
    }

    fn test_call(seed: u8) -> Call {
        Call::new(test_address(seed), seed as u64, vec![seed, seed])
    }

    #[test]
    fn test_batch_length_mismatch() {
        let result = CallBatch::new(
            &[test_address(1), test_address(2)],
            &[0],
            &[vec![], vec![]],
            Hash::zero(),
        );
        assert_eq!(result, Err(TimelockError::MalformedBatch));

        let result = CallBatch::new(&[test_address(1)], &[0], &[], Hash::zero());
        assert_eq!(result, Err(TimelockError::MalformedBatch));
    }

    #[test]
    fn test_batch_empty() {
        let result = CallBatch::new(&[], &[], &[], Hash::zero());
        assert_eq!(result, Err(TimelockError::EmptyBatch));
    }

    #[test]
    fn test_batch_too_large() {
        let calls = (0..=MAX_BATCH_SIZE).map(|_| test_call(1)).collect();
        let result = CallBatch::from_calls(calls, Hash::zero());
        assert_eq!(
            result,
            Err(TimelockError::BatchTooLarge {
                len: MAX_BATCH_SIZE + 1,
                max: MAX_BATCH_SIZE,
            })
        );
    }

    #[test]
    fn test_operation_id_reproducible() {
        let batch = CallBatch::from_calls(vec![test_call(1), test_call(2)], Hash::zero()).unwrap();
        let again = CallBatch::new(
            &[test_address(1), test_address(2)],
            &[1, 2],
            &[vec![1, 1], vec![2, 2]],
            Hash::zero(),
        )
        .unwrap();
        assert_eq!(batch.operation_id(), again.operation_id());
    }

    #[test]
    fn test_operation_id_order_sensitive() {
        let forward =
            CallBatch::from_calls(vec![test_call(1), test_call(2)], Hash::zero()).unwrap();
        let reversed =
            CallBatch::from_calls(vec![test_call(2), test_call(1)], Hash::zero()).unwrap();
        assert_ne!(forward.operation_id(), reversed.operation_id());
    }

    #[test]
    fn test_operation_id_salt_sensitive() {
        let calls = vec![test_call(1)];
        let a = CallBatch::from_calls(calls.clone(), Hash::zero()).unwrap();
        let b = CallBatch::from_calls(calls, Hash::max()).unwrap();
        assert_ne!(a.operation_id(), b.operation_id());
    }

    #[test]
    fn test_batch_serializer_roundtrip() {
        let batch = CallBatch::from_calls(vec![test_call(3), test_call(9)], Hash::max()).unwrap();
        let decoded = CallBatch::from_bytes(&batch.to_bytes()).unwrap();
        assert_eq!(batch, decoded);
    }
}
