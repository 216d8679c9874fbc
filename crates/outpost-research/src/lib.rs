//! Research progression for the colony engine.
//!
//! Players unlock technologies through two cost models: *point-cost*
//! research accrues an abstract research-point currency produced by labs,
//! and *production-threshold* research accrues the player's realized
//! production of one named material until a cumulative total is reached.
//!
//! Research is player-scoped, not planet-scoped: a player advances at most
//! one item at a time, fed by production aggregated across all owned
//! planets. Prerequisites form chains validated by the catalog; starting an
//! item additionally requires a minimum number of active Research-category
//! buildings (labs).
//!
//! The orchestrator drives the ledger once per player per tick via
//! [`ResearchLedger::advance`] and drains emitted events afterwards.

use outpost_core::catalog::{Catalog, ResearchCost, Unlock};
use outpost_core::clock::Timestamp;
use outpost_core::event::Event;
use outpost_core::fixed::{Fixed64, Ticks};
use outpost_core::id::{BuildingTypeId, PlayerId, ResearchTypeId, ShipTypeId};
use outpost_core::resource::ResourceSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by research commands. All are recoverable rejections of a
/// single command; no state changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResearchError {
    #[error("research not found: {0:?}")]
    UnknownResearch(ResearchTypeId),

    #[error("research {research:?} requires {prerequisite:?} to be completed")]
    PrerequisiteUnmet {
        research: ResearchTypeId,
        prerequisite: ResearchTypeId,
    },

    #[error("research {research:?} requires {required} active labs, player has {active}")]
    InsufficientLabs {
        research: ResearchTypeId,
        required: u32,
        active: u32,
    },

    #[error("another research is already in progress: {0:?}")]
    AlreadyInProgress(ResearchTypeId),

    #[error("research {0:?} is already completed")]
    AlreadyCompleted(ResearchTypeId),

    #[error("production rate of the required resource is zero; research {0:?} could never complete")]
    InsufficientProduction(ResearchTypeId),

    #[error("no research in progress")]
    NothingInProgress,
}

// ---------------------------------------------------------------------------
// Per-player state
// ---------------------------------------------------------------------------

/// The research a player is currently working on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveResearch {
    pub research: ResearchTypeId,
    /// Accumulated points or realized production, depending on the cost
    /// model.
    pub progress: Fixed64,
    pub started_at: Timestamp,
}

/// One player's research record: completions plus the in-progress item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerResearch {
    /// Completed research with completion timestamps. Immutable once set.
    completed: BTreeMap<ResearchTypeId, Timestamp>,
    /// At most one in-progress item per player.
    in_progress: Option<ActiveResearch>,
}

/// Player-facing status of one research item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchStatus {
    Completed,
    InProgress,
    /// Startable now: prerequisite completed (or none).
    Available,
    /// Prerequisite chain not yet completed.
    Locked,
}

// ---------------------------------------------------------------------------
// ResearchLedger
// ---------------------------------------------------------------------------

/// Research state for every player. Fully serializable for the persistence
/// collaborator; pending events are transient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchLedger {
    players: BTreeMap<PlayerId, PlayerResearch>,

    /// Events emitted since last drain. Not serialized (transient).
    #[serde(skip)]
    events: Vec<Event>,
}

impl ResearchLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Commands --

    /// Start researching an item for a player.
    ///
    /// `active_labs` is the player's count of active Research-category
    /// buildings; `production_rates` is the player's current per-tick
    /// material production, used to gate threshold research that could never
    /// finish at zero rate.
    pub fn start(
        &mut self,
        catalog: &Catalog,
        player: PlayerId,
        research: ResearchTypeId,
        active_labs: u32,
        production_rates: &ResourceSet,
        now: Timestamp,
        tick: Ticks,
    ) -> Result<(), ResearchError> {
        let spec = catalog
            .research(research)
            .ok_or(ResearchError::UnknownResearch(research))?;

        let record = self.players.entry(player).or_default();

        if record.completed.contains_key(&research) {
            return Err(ResearchError::AlreadyCompleted(research));
        }
        if let Some(prerequisite) = spec.prerequisite
            && !record.completed.contains_key(&prerequisite)
        {
            return Err(ResearchError::PrerequisiteUnmet {
                research,
                prerequisite,
            });
        }
        if active_labs < spec.required_labs {
            return Err(ResearchError::InsufficientLabs {
                research,
                required: spec.required_labs,
                active: active_labs,
            });
        }
        if let Some(active) = &record.in_progress {
            return Err(ResearchError::AlreadyInProgress(active.research));
        }
        if let ResearchCost::ProductionThreshold { resource, .. } = spec.cost
            && production_rates.get(resource) <= Fixed64::ZERO
        {
            return Err(ResearchError::InsufficientProduction(research));
        }

        record.in_progress = Some(ActiveResearch {
            research,
            progress: Fixed64::ZERO,
            started_at: now,
        });
        self.events.push(Event::ResearchStarted {
            player,
            research,
            tick,
        });
        Ok(())
    }

    /// Advance a player's in-progress research by one tick.
    ///
    /// `points` is the player's research-point output this tick;
    /// `realized_production` is what was actually credited to the player's
    /// ledgers this tick (post-clamp). The applicable contribution is picked
    /// by the cost model. No-op if nothing is in progress.
    ///
    /// Returns the unlock when the research completed this tick.
    pub fn advance(
        &mut self,
        catalog: &Catalog,
        player: PlayerId,
        points: Fixed64,
        realized_production: &ResourceSet,
        now: Timestamp,
        tick: Ticks,
    ) -> Option<Unlock> {
        let record = self.players.get_mut(&player)?;
        let active = record.in_progress.as_mut()?;
        let spec = catalog.research(active.research)?;

        let contribution = match &spec.cost {
            ResearchCost::Points { .. } => points,
            ResearchCost::ProductionThreshold { resource, .. } => {
                realized_production.get(*resource)
            }
        };
        let target = spec.cost.target();
        active.progress += contribution.max(Fixed64::ZERO);

        let research = active.research;
        self.events.push(Event::ResearchProgress {
            player,
            research,
            progress: active.progress.min(target),
            target,
            tick,
        });

        if active.progress >= target {
            record.completed.insert(research, now);
            record.in_progress = None;
            self.events.push(Event::ResearchCompleted {
                player,
                research,
                unlock: spec.unlock.clone(),
                tick,
            });
            return Some(spec.unlock.clone());
        }
        None
    }

    /// Cancel a player's in-progress research, discarding all accumulated
    /// progress. There is no refund of elapsed ticks; callers surface this
    /// to the player as a confirmation warning.
    pub fn cancel(&mut self, player: PlayerId) -> Result<ResearchTypeId, ResearchError> {
        let record = self
            .players
            .get_mut(&player)
            .ok_or(ResearchError::NothingInProgress)?;
        let active = record
            .in_progress
            .take()
            .ok_or(ResearchError::NothingInProgress)?;
        Ok(active.research)
    }

    // -- Queries --

    /// Whether a player has completed a research item.
    pub fn is_completed(&self, player: PlayerId, research: ResearchTypeId) -> bool {
        self.players
            .get(&player)
            .is_some_and(|r| r.completed.contains_key(&research))
    }

    /// When a player completed a research item, if they have.
    pub fn completed_at(
        &self,
        player: PlayerId,
        research: ResearchTypeId,
    ) -> Option<Timestamp> {
        self.players
            .get(&player)?
            .completed
            .get(&research)
            .copied()
    }

    /// The player's in-progress research, if any.
    pub fn active(&self, player: PlayerId) -> Option<&ActiveResearch> {
        self.players.get(&player)?.in_progress.as_ref()
    }

    /// Players that currently have research in progress, in ID order.
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, record)| record.in_progress.is_some())
            .map(|(player, _)| *player)
            .collect()
    }

    /// Player-facing status of one research item.
    pub fn status(
        &self,
        catalog: &Catalog,
        player: PlayerId,
        research: ResearchTypeId,
    ) -> ResearchStatus {
        if self.is_completed(player, research) {
            return ResearchStatus::Completed;
        }
        if self
            .active(player)
            .is_some_and(|active| active.research == research)
        {
            return ResearchStatus::InProgress;
        }
        let prerequisite_met = catalog
            .research(research)
            .and_then(|spec| spec.prerequisite)
            .is_none_or(|prereq| self.is_completed(player, prereq));
        if prerequisite_met {
            ResearchStatus::Available
        } else {
            ResearchStatus::Locked
        }
    }

    /// Building types the player has unlocked through completed research.
    pub fn unlocked_buildings(
        &self,
        catalog: &Catalog,
        player: PlayerId,
    ) -> Vec<BuildingTypeId> {
        self.completed_unlocks(catalog, player)
            .filter_map(|unlock| match unlock {
                Unlock::Building(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Ship designs the player has unlocked through completed research.
    pub fn unlocked_ships(&self, catalog: &Catalog, player: PlayerId) -> Vec<ShipTypeId> {
        self.completed_unlocks(catalog, player)
            .filter_map(|unlock| match unlock {
                Unlock::Ship(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Summed percentage bonuses by name across completed research. Other
    /// subsystems query this by bonus name (e.g. "defense").
    pub fn bonuses(&self, catalog: &Catalog, player: PlayerId) -> BTreeMap<String, Fixed64> {
        let mut out = BTreeMap::new();
        for unlock in self.completed_unlocks(catalog, player) {
            if let Unlock::Bonus { name, percent } = unlock {
                *out.entry(name).or_insert(Fixed64::ZERO) += percent;
            }
        }
        out
    }

    fn completed_unlocks<'a>(
        &'a self,
        catalog: &'a Catalog,
        player: PlayerId,
    ) -> impl Iterator<Item = Unlock> + 'a {
        self.players
            .get(&player)
            .into_iter()
            .flat_map(|record| record.completed.keys())
            .filter_map(|id| catalog.research(*id))
            .map(|spec| spec.unlock.clone())
    }

    // -- Event API --

    /// Drain all pending events, clearing the internal list.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
