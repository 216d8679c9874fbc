//! Resource kinds and the keyed balance container.
//!
//! Material balances are kept in a [`ResourceSet`], a `BTreeMap` keyed by
//! [`ResourceKind`]. The map form makes the shared-capacity invariant a
//! single reduction over values, and the BTreeMap ordering doubles as the
//! deterministic credit order when several kinds are credited in one pass.

use crate::fixed::Fixed64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// A named material resource stored in a planet's shared warehouse.
///
/// Energy is deliberately not a variant: it has its own store, capacity, and
/// credit/debit path on the ledger. Research points are player-scoped and
/// never stored on a planet at all.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum ResourceKind {
    Credits,
    Durastahl,
    Crystal,
    Tritium,
}

impl ResourceKind {
    /// All material kinds, in the canonical (credit) order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Credits,
        ResourceKind::Durastahl,
        ResourceKind::Crystal,
        ResourceKind::Tritium,
    ];

    /// Lowercase identifier used in data files and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Credits => "credits",
            ResourceKind::Durastahl => "durastahl",
            ResourceKind::Crystal => "crystal",
            ResourceKind::Tritium => "tritium",
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceSet
// ---------------------------------------------------------------------------

/// A set of per-kind amounts: balances, production rates, or costs.
///
/// Zero entries are not stored; `get` returns zero for absent kinds.
/// Iteration order is the `ResourceKind` ordering, which callers rely on for
/// deterministic credit passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet(BTreeMap<ResourceKind, Fixed64>);

impl ResourceSet {
    /// An empty set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a set from `(kind, amount)` pairs. Later duplicates overwrite.
    pub fn of(entries: &[(ResourceKind, Fixed64)]) -> Self {
        let mut set = Self::new();
        for &(kind, amount) in entries {
            set.set(kind, amount);
        }
        set
    }

    /// The amount for a kind, zero if absent.
    pub fn get(&self, kind: ResourceKind) -> Fixed64 {
        self.0.get(&kind).copied().unwrap_or(Fixed64::ZERO)
    }

    /// Set the amount for a kind. Setting zero removes the entry.
    pub fn set(&mut self, kind: ResourceKind, amount: Fixed64) {
        if amount == Fixed64::ZERO {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, amount);
        }
    }

    /// Add `amount` (may be negative) to a kind's entry.
    pub fn add(&mut self, kind: ResourceKind, amount: Fixed64) {
        let next = self.get(kind) + amount;
        self.set(kind, next);
    }

    /// Sum of all amounts. The shared-capacity invariant is a comparison
    /// against this value.
    pub fn total(&self) -> Fixed64 {
        self.0.values().fold(Fixed64::ZERO, |acc, v| acc + *v)
    }

    /// Iterate `(kind, amount)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Fixed64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Whether the set holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every amount multiplied by `factor`. Used for level scaling and the
    /// 50% demolition refund.
    pub fn scaled(&self, factor: Fixed64) -> ResourceSet {
        let mut out = ResourceSet::new();
        for (kind, amount) in self.iter() {
            out.set(kind, amount * factor);
        }
        out
    }

    /// Whether any amount is negative. Catalog validation and the tick-time
    /// integrity guard both check this.
    pub fn has_negative(&self) -> bool {
        self.0.values().any(|v| *v < Fixed64::ZERO)
    }
}

impl FromIterator<(ResourceKind, Fixed64)> for ResourceSet {
    fn from_iter<T: IntoIterator<Item = (ResourceKind, Fixed64)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (kind, amount) in iter {
            set.set(kind, amount);
        }
        set
    }
}
