// Payload codec for calls addressed to a vault.

use serde::{Deserialize, Serialize};

use crate::crypto::{Address, Hash};
use crate::serializer::{Reader, ReaderError, Serializer, Writer};

/// Vault action encoded in a call payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultAction {
    /// Move the vault's entire holding of an asset to a recipient
    Withdraw { asset: Hash, recipient: Address },
    /// Record a new implementation code hash
    UpgradeImplementation { code: Hash },
}

impl VaultAction {
    /// Get type identifier for serialization
    pub fn type_id(&self) -> u8 {
        match self {
            VaultAction::Withdraw { .. } => 0,
            VaultAction::UpgradeImplementation { .. } => 1,
        }
    }
}

impl Serializer for VaultAction {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(self.type_id());
        match self {
            VaultAction::Withdraw { asset, recipient } => {
                asset.write(writer);
                recipient.write(writer);
            }
            VaultAction::UpgradeImplementation { code } => {
                code.write(writer);
            }
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let tag = reader.read_u8()?;
        match tag {
            0 => Ok(VaultAction::Withdraw {
                asset: Hash::read(reader)?,
                recipient: Address::read(reader)?,
            }),
            1 => Ok(VaultAction::UpgradeImplementation {
                code: Hash::read(reader)?,
            }),
            _ => Err(ReaderError::InvalidValue),
        }
    }

    fn size(&self) -> usize {
        1 + match self {
            VaultAction::Withdraw { asset, recipient } => asset.size() + recipient.size(),
            VaultAction::UpgradeImplementation { code } => code.size(),
        }
    }
}
