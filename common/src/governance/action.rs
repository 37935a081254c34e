// Payload codec for calls addressed to the controller itself.
//
// When a dispatched call targets the engine's own address, its payload
// decodes to one of these actions and is applied reentrantly under the
// engine origin.

use serde::{Deserialize, Serialize};

use crate::crypto::{Address, Hash};
use crate::governance::RoleId;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampSeconds;

/// Governance action encoded in a call payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineAction {
    /// Add an account to a role
    GrantRole { role: RoleId, account: Address },
    /// Remove an account from a role
    RevokeRole { role: RoleId, account: Address },
    /// Replace the minimum execution delay
    UpdateDelay { delay: TimestampSeconds },
    /// Schedule another batch, given in parallel-array form
    Schedule {
        targets: Vec<Address>,
        values: Vec<u64>,
        payloads: Vec<Vec<u8>>,
        salt: Hash,
    },
}

impl EngineAction {
    /// Get type identifier for serialization
    pub fn type_id(&self) -> u8 {
        match self {
            EngineAction::GrantRole { .. } => 0,
            EngineAction::RevokeRole { .. } => 1,
            EngineAction::UpdateDelay { .. } => 2,
            EngineAction::Schedule { .. } => 3,
        }
    }
}

impl Serializer for EngineAction {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.type_id());
        match self {
            EngineAction::GrantRole { role, account }
            | EngineAction::RevokeRole { role, account } => {
                writer.write_bytes(role);
                account.write(writer);
            }
            EngineAction::UpdateDelay { delay } => {
                delay.write(writer);
            }
            EngineAction::Schedule {
                targets,
                values,
                payloads,
                salt,
            } => {
                targets.write(writer);
                values.write(writer);
                payloads.write(writer);
                salt.write(writer);
            }
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let tag = reader.read_u8()?;
        match tag {
            0 => Ok(EngineAction::GrantRole {
                role: reader.read_bytes_32()?,
                account: Address::read(reader)?,
            }),
            1 => Ok(EngineAction::RevokeRole {
                role: reader.read_bytes_32()?,
                account: Address::read(reader)?,
            }),
            2 => Ok(EngineAction::UpdateDelay {
                delay: u64::read(reader)?,
            }),
            3 => Ok(EngineAction::Schedule {
                targets: Vec::read(reader)?,
                values: Vec::read(reader)?,
                payloads: Vec::read(reader)?,
                salt: Hash::read(reader)?,
            }),
            _ => Err(ReaderError::InvalidValue),
        }
    }

    fn size(&self) -> usize {
        1 + match self {
            EngineAction::GrantRole { role, account }
            | EngineAction::RevokeRole { role, account } => role.size() + account.size(),
            EngineAction::UpdateDelay { delay } => delay.size(),
            EngineAction::Schedule {
                targets,
                values,
                payloads,
                salt,
            } => targets.size() + values.size() + payloads.size() + salt.size(),
        }
    }
}
