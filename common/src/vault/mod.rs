// Administered Vault
// The asset-holding collaborator the controller ultimately administers.
//
// Every privileged entry point is gated on the presented caller being
// the current owner. Deployment wiring sets the owner to the engine's
// address, so these operations are only reachable through an executed
// batch. The vault does not interpret governance semantics; it only
// trusts the caller identity the engine presents.

mod action;
mod error;

pub use action::*;
pub use error::*;

use std::any::Any;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::crypto::{Address, Hash};
use crate::governance::{AdministeredTarget, RuntimeContext, Timelock, TimelockResult};
use crate::serializer::Serializer;

/// Minimal (holder, asset) -> amount ledger.
///
/// Just enough bookkeeping to observe the withdraw capability
/// end-to-end; real asset accounting lives outside this crate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetBook {
    balances: IndexMap<(Address, Hash), u64>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self {
            balances: IndexMap::new(),
        }
    }

    pub fn balance(&self, holder: &Address, asset: &Hash) -> u64 {
        self.balances
            .get(&(holder.clone(), asset.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn credit(&mut self, holder: Address, asset: Hash, amount: u64) -> VaultResult<()> {
        let entry = self.balances.entry((holder, asset)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(VaultError::Overflow)?;
        Ok(())
    }

    /// Remove and return a holder's entire balance of an asset
    pub fn debit_all(&mut self, holder: &Address, asset: &Hash) -> u64 {
        self.balances
            .shift_remove(&(holder.clone(), asset.clone()))
            .unwrap_or(0)
    }
}

/// Owner-gated vault capability
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vault {
    /// The vault's own address in the capability space
    address: Address,
    /// Current owner; only this principal may withdraw or upgrade
    owner: Address,
    /// Hash of the implementation code currently backing the vault
    implementation: Hash,
    book: AssetBook,
}

impl Vault {
    pub fn new(address: Address, owner: Address, implementation: Hash) -> Self {
        Self {
            address,
            owner,
            implementation,
            book: AssetBook::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn implementation(&self) -> &Hash {
        &self.implementation
    }

    /// The vault's own holding of an asset
    pub fn balance(&self, asset: &Hash) -> u64 {
        self.book.balance(&self.address, asset)
    }

    /// Balance credited to an arbitrary holder by past withdrawals
    pub fn balance_of(&self, holder: &Address, asset: &Hash) -> u64 {
        self.book.balance(holder, asset)
    }

    /// Fund the vault. Deployment/test wiring only; unauthenticated.
    pub fn deposit(&mut self, asset: Hash, amount: u64) -> VaultResult<()> {
        self.book.credit(self.address.clone(), asset, amount)
    }

    /// Move the vault's entire holding of an asset to a recipient.
    /// Owner only.
    pub fn withdraw(
        &mut self,
        ctx: &RuntimeContext,
        asset: &Hash,
        recipient: &Address,
    ) -> VaultResult<u64> {
        if ctx.origin.principal() != &self.owner {
            return Err(VaultError::OwnerRequired);
        }

        let amount = self.book.debit_all(&self.address, asset);
        if amount == 0 {
            return Err(VaultError::UnknownAsset(asset.clone()));
        }
        self.book.credit(recipient.clone(), asset.clone(), amount)?;

        debug!(
            "Vault {} released {} of asset {} to {}",
            self.address, amount, asset, recipient
        );
        Ok(amount)
    }

    /// Record a new implementation code hash. Owner only.
    pub fn upgrade_implementation(
        &mut self,
        ctx: &RuntimeContext,
        code: Hash,
    ) -> VaultResult<()> {
        if ctx.origin.principal() != &self.owner {
            return Err(VaultError::OwnerRequired);
        }

        if code == Hash::zero() {
            return Err(VaultError::InvalidImplementation);
        }

        debug!("Vault {} upgraded implementation to {}", self.address, code);
        self.implementation = code;
        Ok(())
    }
}

impl AdministeredTarget for Vault {
    fn invoke(
        &mut self,
        _engine: &mut Timelock,
        ctx: &RuntimeContext,
        _value: u64,
        payload: &[u8],
    ) -> TimelockResult<()> {
        let action = VaultAction::from_bytes(payload)?;
        match action {
            VaultAction::Withdraw { asset, recipient } => {
                self.withdraw(ctx, &asset, &recipient)?;
            }
            VaultAction::UpgradeImplementation { code } => {
                self.upgrade_implementation(ctx, code)?;
            }
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn AdministeredTarget> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
