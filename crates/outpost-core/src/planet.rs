//! Planet state: ledger, grid fields, and building instances.

use crate::building::BuildingInstance;
use crate::fixed::Fixed64;
use crate::id::{BuildingId, FieldId, PlanetId, PlayerId};
use crate::ledger::ResourceLedger;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// One colonized planet. Created when a player colonizes; mutated every tick
/// and by player commands; never deleted while owned.
///
/// During a tick the planet is owned exclusively by the orchestrator; player
/// commands are serialized against the in-flight tick by the engine's
/// locking wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub owner: PlayerId,
    pub name: String,

    /// Number of buildable grid fields. Field IDs run `0..field_count`.
    pub field_count: u16,

    /// Material balances and the energy store.
    pub ledger: ResourceLedger,

    /// All building instances, keyed by stable instance ID.
    pub buildings: SlotMap<BuildingId, BuildingInstance>,

    /// Latch for transition-only energy shortfall events: true while the
    /// planet had buildings shed for lack of energy on the last tick.
    pub energy_shortfall: bool,

    next_sequence: u64,
}

impl Planet {
    /// Create a freshly colonized planet with an empty ledger.
    pub fn new(
        id: PlanetId,
        owner: PlayerId,
        name: impl Into<String>,
        field_count: u16,
        storage_capacity: Fixed64,
        energy_capacity: Fixed64,
    ) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            field_count,
            ledger: ResourceLedger::new(storage_capacity, energy_capacity),
            buildings: SlotMap::with_key(),
            energy_shortfall: false,
            next_sequence: 0,
        }
    }

    /// The next commission sequence number. Monotonic per planet.
    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    /// Whether a field lies on this planet's grid.
    pub fn field_in_range(&self, field: FieldId) -> bool {
        field.0 < self.field_count
    }

    /// Whether any building occupies the given field.
    pub fn field_occupied(&self, field: FieldId) -> bool {
        self.buildings.values().any(|b| b.field == field)
    }

    /// Iterate active building instances (construction finished, online or
    /// not) with their IDs.
    pub fn active_buildings(
        &self,
    ) -> impl Iterator<Item = (BuildingId, &BuildingInstance)> {
        self.buildings.iter().filter(|(_, b)| b.is_active())
    }

    /// Iterate active, currently powered building instances.
    pub fn online_buildings(
        &self,
    ) -> impl Iterator<Item = (BuildingId, &BuildingInstance)> {
        self.buildings.iter().filter(|(_, b)| b.is_online())
    }
}
