//! Per-tick simulation events.
//!
//! The orchestrator appends events to an [`EventQueue`] while processing a
//! tick; the transport collaborator drains the queue afterwards and relays
//! the events to clients. Nothing inside the engine subscribes to events, so
//! simulation correctness never depends on delivery.

use crate::catalog::Unlock;
use crate::fixed::{Fixed64, Ticks};
use crate::id::{BuildingId, BuildingTypeId, PlanetId, PlayerId, ResearchTypeId};
use crate::resource::ResourceSet;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // -- Construction --
    BuildingCommissioned {
        planet: PlanetId,
        building: BuildingId,
        building_type: BuildingTypeId,
        tick: Ticks,
    },
    BuildingCompleted {
        planet: PlanetId,
        building: BuildingId,
        tick: Ticks,
    },
    BuildingDemolished {
        planet: PlanetId,
        building: BuildingId,
        refund: ResourceSet,
        tick: Ticks,
    },

    // -- Ledger --
    ResourcesUpdated {
        planet: PlanetId,
        balances: ResourceSet,
        energy: Fixed64,
        tick: Ticks,
    },

    // -- Energy --
    EnergyShortfall {
        planet: PlanetId,
        /// Unmet upkeep of the buildings taken offline.
        deficit: Fixed64,
        tick: Ticks,
    },
    EnergyRestored {
        planet: PlanetId,
        tick: Ticks,
    },

    // -- Research --
    ResearchStarted {
        player: PlayerId,
        research: ResearchTypeId,
        tick: Ticks,
    },
    ResearchProgress {
        player: PlayerId,
        research: ResearchTypeId,
        progress: Fixed64,
        target: Fixed64,
        tick: Ticks,
    },
    ResearchCompleted {
        player: PlayerId,
        research: ResearchTypeId,
        unlock: Unlock,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for filtering by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BuildingCommissioned,
    BuildingCompleted,
    BuildingDemolished,
    ResourcesUpdated,
    EnergyShortfall,
    EnergyRestored,
    ResearchStarted,
    ResearchProgress,
    ResearchCompleted,
}

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::BuildingCommissioned { .. } => EventKind::BuildingCommissioned,
            Event::BuildingCompleted { .. } => EventKind::BuildingCompleted,
            Event::BuildingDemolished { .. } => EventKind::BuildingDemolished,
            Event::ResourcesUpdated { .. } => EventKind::ResourcesUpdated,
            Event::EnergyShortfall { .. } => EventKind::EnergyShortfall,
            Event::EnergyRestored { .. } => EventKind::EnergyRestored,
            Event::ResearchStarted { .. } => EventKind::ResearchStarted,
            Event::ResearchProgress { .. } => EventKind::ResearchProgress,
            Event::ResearchCompleted { .. } => EventKind::ResearchCompleted,
        }
    }
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Append-only queue of events for the current tick window. Drained whole by
/// the transport collaborator.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Append a batch of events in order.
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Take all pending events, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view of pending events.
    pub fn pending(&self) -> &[Event] {
        &self.events
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_event(tick: Ticks) -> Event {
        Event::ResearchCompleted {
            player: PlayerId(1),
            research: ResearchTypeId(0),
            unlock: Unlock::Bonus {
                name: "defense".to_string(),
                percent: Fixed64::from_num(15),
            },
            tick,
        }
    }

    #[test]
    fn push_and_drain_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(completed_event(1));
        queue.push(Event::EnergyRestored {
            planet: PlanetId(2),
            tick: 1,
        });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind(), EventKind::ResearchCompleted);
        assert_eq!(drained[1].kind(), EventKind::EnergyRestored);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_twice_returns_empty() {
        let mut queue = EventQueue::new();
        queue.push(completed_event(3));
        let _ = queue.drain();
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn pending_is_read_only_view() {
        let mut queue = EventQueue::new();
        queue.extend([completed_event(1), completed_event(2)]);
        assert_eq!(queue.pending().len(), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn kind_discriminants() {
        let event = Event::ResourcesUpdated {
            planet: PlanetId(1),
            balances: ResourceSet::new(),
            energy: Fixed64::ZERO,
            tick: 9,
        };
        assert_eq!(event.kind(), EventKind::ResourcesUpdated);
    }
}
