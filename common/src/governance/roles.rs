//! Governance Role System
//!
//! Role-based access control for the timelock controller.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::time::TimestampSeconds;

/// Role identifier (32 bytes for flexibility)
pub type RoleId = [u8; 32];

/// Create a RoleId from a string name (hash of the name)
pub fn role_id_from_name(name: &str) -> RoleId {
    use blake3::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(b"GOVERNANCE_ROLE:");
    hasher.update(name.as_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(result.as_bytes());
    id
}

// Predefined roles - use hash of role name for consistency

/// Admin role - administers role membership outside batch execution
pub const ADMIN_ROLE: RoleId = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Proposer role - may schedule operation batches
pub const PROPOSER_ROLE: RoleId = [
    0x50, 0x52, 0x4f, 0x50, 0x4f, 0x53, 0x45, 0x52, // PROPOSER
    0x5f, 0x52, 0x4f, 0x4c, 0x45, 0x00, 0x00, 0x00, // _ROLE
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// Check if a role is a predefined role
pub fn is_predefined_role(role: &RoleId) -> bool {
    *role == ADMIN_ROLE || *role == PROPOSER_ROLE
}

/// Get the name of a predefined role
pub fn predefined_role_name(role: &RoleId) -> Option<&'static str> {
    if *role == ADMIN_ROLE {
        Some("ADMIN")
    } else if *role == PROPOSER_ROLE {
        Some("PROPOSER")
    } else {
        None
    }
}

/// Role membership table
///
/// Tracks, per role, which principals hold it and when it was granted.
/// Grants are idempotent and revoking a non-member is a no-op; the
/// controller surfaces authorization failures, not membership churn.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleTable {
    members: IndexMap<RoleId, IndexMap<Address, TimestampSeconds>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self {
            members: IndexMap::new(),
        }
    }

    /// Check if an account holds a role. Pure lookup.
    pub fn has_role(&self, role: &RoleId, account: &Address) -> bool {
        self.members
            .get(role)
            .map(|accounts| accounts.contains_key(account))
            .unwrap_or(false)
    }

    /// Add an account to a role. Returns false if it was already a member.
    pub fn grant(&mut self, role: RoleId, account: Address, granted_at: TimestampSeconds) -> bool {
        let accounts = self.members.entry(role).or_default();
        if accounts.contains_key(&account) {
            return false;
        }
        accounts.insert(account, granted_at);
        true
    }

    /// Remove an account from a role. Returns false if it was not a member.
    pub fn revoke(&mut self, role: &RoleId, account: &Address) -> bool {
        self.members
            .get_mut(role)
            .and_then(|accounts| accounts.shift_remove(account))
            .is_some()
    }

    /// When the role was granted, if held
    pub fn granted_at(&self, role: &RoleId, account: &Address) -> Option<TimestampSeconds> {
        self.members
            .get(role)
            .and_then(|accounts| accounts.get(account))
            .copied()
    }

    /// Number of members currently holding a role
    pub fn member_count(&self, role: &RoleId) -> usize {
        self.members.get(role).map(IndexMap::len).unwrap_or(0)
    }
}
