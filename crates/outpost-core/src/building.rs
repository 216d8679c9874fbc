//! Building instances and their construction lifecycle.

use crate::clock::Timestamp;
use crate::id::{BuildingTypeId, FieldId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lifecycle state
// ---------------------------------------------------------------------------

/// Construction lifecycle of one building instance.
///
/// `Active` carries its completion time, so a completed-but-inactive or
/// active-but-uncompleted combination cannot be represented. `online` is
/// recomputed by the energy subsystem every tick: an active building is taken
/// offline when the planet cannot power it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingState {
    /// Commissioned; costs paid; waiting out the build duration.
    UnderConstruction { started_at: Timestamp },

    /// Construction finished. Produces and consumes only while `online`.
    Active { completed_at: Timestamp, online: bool },

    /// Torn down. Terminal; the instance is removed right after entering
    /// this state, so it is only ever observed in demolition events.
    Demolished,
}

// ---------------------------------------------------------------------------
// Building instance
// ---------------------------------------------------------------------------

/// A concrete, leveled building occupying one field on one planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingInstance {
    /// The catalog definition this instance was built from.
    pub building_type: BuildingTypeId,

    /// The grid field it occupies.
    pub field: FieldId,

    /// Level, starting at 1. Scales every rate and upkeep linearly.
    pub level: u32,

    /// Planet-wide commission counter. Newer instances have higher values;
    /// the energy subsystem sheds the newest consumers first.
    pub sequence: u64,

    /// Construction lifecycle state.
    pub state: BuildingState,
}

impl BuildingInstance {
    /// Create a freshly commissioned instance at level 1.
    pub fn commissioned(
        building_type: BuildingTypeId,
        field: FieldId,
        sequence: u64,
        started_at: Timestamp,
    ) -> Self {
        Self {
            building_type,
            field,
            level: 1,
            sequence,
            state: BuildingState::UnderConstruction { started_at },
        }
    }

    /// Whether construction has finished.
    pub fn is_active(&self) -> bool {
        matches!(self.state, BuildingState::Active { .. })
    }

    /// Whether the building is active and currently powered.
    pub fn is_online(&self) -> bool {
        matches!(self.state, BuildingState::Active { online: true, .. })
    }

    /// Completion time, if construction has finished.
    pub fn completed_at(&self) -> Option<Timestamp> {
        match self.state {
            BuildingState::Active { completed_at, .. } => Some(completed_at),
            _ => None,
        }
    }

    /// Flip the online flag. No effect unless the building is active.
    pub fn set_online(&mut self, value: bool) {
        if let BuildingState::Active { online, .. } = &mut self.state {
            *online = value;
        }
    }
}
