//! Per-planet resource ledger.
//!
//! Materials share one storage pool: the sum of all material balances is
//! capped by `storage_capacity`, and production that does not fit is dropped
//! ("use it or lose it", never queued). Energy has its own store and its own
//! capacity, with a separate credit/debit path.
//!
//! Debits are atomic: a debit that cannot be covered fails without touching
//! any balance. Callers must treat that as a definitive refusal, not a retry
//! signal.

use crate::fixed::Fixed64;
use crate::resource::{ResourceKind, ResourceSet};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A debit exceeded the available balance of one kind.
    #[error("insufficient {kind:?}: requested {requested}, available {available}")]
    InsufficientResources {
        kind: ResourceKind,
        requested: Fixed64,
        available: Fixed64,
    },

    /// An energy debit exceeded the current energy store.
    #[error("insufficient energy: requested {requested}, available {available}")]
    InsufficientEnergy {
        requested: Fixed64,
        available: Fixed64,
    },

    /// A credit or debit was asked for a negative amount. This is a
    /// data-integrity fault in the caller's inputs, never a player mistake.
    #[error("negative amount {amount} for {kind:?}")]
    NegativeAmount { kind: ResourceKind, amount: Fixed64 },

    /// A negative energy amount was passed to an energy operation.
    #[error("negative energy amount {amount}")]
    NegativeEnergyAmount { amount: Fixed64 },
}

// ---------------------------------------------------------------------------
// ResourceLedger
// ---------------------------------------------------------------------------

/// The balances of one planet: materials in a shared-capacity warehouse and
/// a separately bounded energy store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    balances: ResourceSet,
    storage_capacity: Fixed64,
    energy: Fixed64,
    energy_capacity: Fixed64,
}

impl ResourceLedger {
    /// Create an empty ledger with the given capacities.
    pub fn new(storage_capacity: Fixed64, energy_capacity: Fixed64) -> Self {
        Self {
            balances: ResourceSet::new(),
            storage_capacity,
            energy: Fixed64::ZERO,
            energy_capacity,
        }
    }

    // -- Material path --

    /// Credit `amount` of a material. The warehouse is a shared pool: only
    /// `storage_capacity - total()` fits, and the rest is dropped.
    ///
    /// Returns the overflow that did not fit.
    pub fn credit(
        &mut self,
        kind: ResourceKind,
        amount: Fixed64,
    ) -> Result<Fixed64, LedgerError> {
        if amount < Fixed64::ZERO {
            return Err(LedgerError::NegativeAmount { kind, amount });
        }
        let space = (self.storage_capacity - self.balances.total()).max(Fixed64::ZERO);
        let fits = amount.min(space);
        self.balances.add(kind, fits);
        Ok(amount - fits)
    }

    /// Credit several materials at once, in canonical kind order. Returns the
    /// per-kind overflow that did not fit.
    pub fn credit_all(&mut self, amounts: &ResourceSet) -> Result<ResourceSet, LedgerError> {
        let mut overflow = ResourceSet::new();
        for (kind, amount) in amounts.iter() {
            let dropped = self.credit(kind, amount)?;
            overflow.set(kind, dropped);
        }
        Ok(overflow)
    }

    /// Debit `amount` of a material. Fails atomically if the balance does not
    /// cover it.
    pub fn debit(&mut self, kind: ResourceKind, amount: Fixed64) -> Result<(), LedgerError> {
        if amount < Fixed64::ZERO {
            return Err(LedgerError::NegativeAmount { kind, amount });
        }
        let available = self.balances.get(kind);
        if available < amount {
            return Err(LedgerError::InsufficientResources {
                kind,
                requested: amount,
                available,
            });
        }
        self.balances.add(kind, -amount);
        Ok(())
    }

    /// Verify that every kind in `costs` is covered, without mutating.
    pub fn check_debit_all(&self, costs: &ResourceSet) -> Result<(), LedgerError> {
        for (kind, amount) in costs.iter() {
            if amount < Fixed64::ZERO {
                return Err(LedgerError::NegativeAmount { kind, amount });
            }
            let available = self.balances.get(kind);
            if available < amount {
                return Err(LedgerError::InsufficientResources {
                    kind,
                    requested: amount,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Debit several materials all-or-nothing: either every kind is covered
    /// and all are deducted, or nothing changes.
    pub fn debit_all(&mut self, costs: &ResourceSet) -> Result<(), LedgerError> {
        self.check_debit_all(costs)?;
        for (kind, amount) in costs.iter() {
            self.balances.add(kind, -amount);
        }
        Ok(())
    }

    // -- Energy path --

    /// Credit energy, clamped at the energy capacity. Returns the overflow.
    pub fn credit_energy(&mut self, amount: Fixed64) -> Result<Fixed64, LedgerError> {
        if amount < Fixed64::ZERO {
            return Err(LedgerError::NegativeEnergyAmount { amount });
        }
        let space = (self.energy_capacity - self.energy).max(Fixed64::ZERO);
        let fits = amount.min(space);
        self.energy += fits;
        Ok(amount - fits)
    }

    /// Verify an energy debit is covered, without mutating.
    pub fn check_debit_energy(&self, amount: Fixed64) -> Result<(), LedgerError> {
        if amount < Fixed64::ZERO {
            return Err(LedgerError::NegativeEnergyAmount { amount });
        }
        if self.energy < amount {
            return Err(LedgerError::InsufficientEnergy {
                requested: amount,
                available: self.energy,
            });
        }
        Ok(())
    }

    /// Debit energy. Fails atomically if the store does not cover it.
    pub fn debit_energy(&mut self, amount: Fixed64) -> Result<(), LedgerError> {
        self.check_debit_energy(amount)?;
        self.energy -= amount;
        Ok(())
    }

    /// Apply a signed net energy delta, clamping the store to
    /// `[0, energy_capacity]`. Returns the store after clamping.
    ///
    /// The energy subsystem sheds consumers before calling this, so a clamp
    /// at zero only absorbs sub-tick rounding, never a real deficit.
    pub fn apply_energy_delta(&mut self, delta: Fixed64) -> Fixed64 {
        self.energy = (self.energy + delta)
            .max(Fixed64::ZERO)
            .min(self.energy_capacity);
        self.energy
    }

    // -- Queries --

    /// The current balance of one material kind.
    pub fn balance(&self, kind: ResourceKind) -> Fixed64 {
        self.balances.get(kind)
    }

    /// An owned copy of all material balances.
    pub fn snapshot(&self) -> ResourceSet {
        self.balances.clone()
    }

    /// Sum of all material balances.
    pub fn stored_total(&self) -> Fixed64 {
        self.balances.total()
    }

    /// The shared material storage capacity.
    pub fn storage_capacity(&self) -> Fixed64 {
        self.storage_capacity
    }

    /// The current energy store.
    pub fn energy(&self) -> Fixed64 {
        self.energy
    }

    /// The energy storage capacity.
    pub fn energy_capacity(&self) -> Fixed64 {
        self.energy_capacity
    }
}

// ===========================================================================
// Tests
// ===========================================================================
