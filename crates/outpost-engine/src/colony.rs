//! The colony engine: planets, players, and the tick orchestrator.
//!
//! [`Colony`] owns every planet's state, the player research ledger, the
//! event queue, and an injected [`Clock`]. An external scheduler (or an
//! admin command) calls [`Colony::run_tick`] at the configured times; the
//! engine never decides *when* a tick fires, only what happens during one.

use crate::command::CommandLog;
use crate::construction;
use crate::error::EngineError;
use outpost_core::catalog::{BuildingCategory, Catalog};
use outpost_core::clock::{Clock, Timestamp};
use outpost_core::event::{Event, EventQueue};
use outpost_core::fixed::{Fixed64, Ticks};
use outpost_core::id::{BuildingId, BuildingTypeId, FieldId, PlanetId, PlayerId, ResearchTypeId};
use outpost_core::planet::Planet;
use outpost_core::resource::ResourceSet;
use outpost_energy::EnergyBalance;
use outpost_research::{ResearchLedger, ResearchStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Aggregated per-player view across all owned planets. Owned copies only,
/// suitable for handing to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Number of planets the player owns.
    pub planets: usize,
    /// Material production per tick from online buildings.
    pub production: ResourceSet,
    /// Research points per tick from online labs.
    pub research_rate: Fixed64,
    /// Energy production and upkeep per tick, summed over planets.
    pub energy: EnergyBalance,
    /// Current material balances, summed over planets.
    pub stored: ResourceSet,
    /// Summed material storage capacity.
    pub storage_capacity: Fixed64,
    /// Current energy stores, summed over planets.
    pub energy_stored: Fixed64,
    /// Summed energy storage capacity.
    pub energy_capacity: Fixed64,
}

/// One research item annotated with its status for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOverview {
    pub research: ResearchTypeId,
    pub name: String,
    pub status: ResearchStatus,
}

/// Result of a completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// The tick counter after this run.
    pub tick: Ticks,
    /// The clock timestamp the tick ran at.
    pub at: Timestamp,
    /// Planets processed normally.
    pub planets_processed: usize,
    /// Planets skipped because of malformed data.
    pub planets_skipped: usize,
}

// ---------------------------------------------------------------------------
// Colony
// ---------------------------------------------------------------------------

/// The simulation engine for one game world.
///
/// All mutation goes through `&mut self`, so a tick and a player command can
/// never interleave; [`crate::sync::SharedColony`] adds the bounded-wait
/// lock for multi-threaded callers.
#[derive(Debug)]
pub struct Colony {
    catalog: Catalog,
    planets: BTreeMap<PlanetId, Planet>,
    research: ResearchLedger,
    events: EventQueue,
    clock: Box<dyn Clock>,
    command_log: CommandLog,
    tick: Ticks,
    last_tick_at: Option<Timestamp>,
    next_planet_id: u32,
}

impl Colony {
    /// Create an engine over a frozen catalog and an injected clock.
    pub fn new(catalog: Catalog, clock: Box<dyn Clock>) -> Self {
        Self {
            catalog,
            planets: BTreeMap::new(),
            research: ResearchLedger::new(),
            events: EventQueue::new(),
            clock,
            command_log: CommandLog::with_max_entries(1_024),
            tick: 0,
            last_tick_at: None,
            next_planet_id: 0,
        }
    }

    // -- World setup --

    /// Register a freshly colonized planet and return its ID.
    pub fn colonize(
        &mut self,
        owner: PlayerId,
        name: impl Into<String>,
        field_count: u16,
        storage_capacity: Fixed64,
        energy_capacity: Fixed64,
    ) -> PlanetId {
        let id = PlanetId(self.next_planet_id);
        self.next_planet_id += 1;
        self.planets.insert(
            id,
            Planet::new(id, owner, name, field_count, storage_capacity, energy_capacity),
        );
        id
    }

    // -- Accessors --

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(&id)
    }

    /// Mutable planet access for persistence glue and tests. Tick-internal
    /// code goes through `run_tick`.
    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(&id)
    }

    pub fn planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets.values()
    }

    pub fn research(&self) -> &ResearchLedger {
        &self.research
    }

    /// The tick counter after the most recent run.
    pub fn current_tick(&self) -> Ticks {
        self.tick
    }

    /// Audit log of executed commands.
    pub fn command_log(&self) -> &CommandLog {
        &self.command_log
    }

    pub(crate) fn log_command(&mut self, command: crate::command::Command) {
        let tick = self.tick;
        self.command_log.record(tick, command);
    }

    // -- Player commands --

    /// Commission a building on a vacant field of one of the player's
    /// planets. Rejections leave the ledger untouched.
    pub fn start_construction(
        &mut self,
        planet: PlanetId,
        building_type: BuildingTypeId,
        field: FieldId,
    ) -> Result<BuildingId, EngineError> {
        let now = self.clock.now();
        let tick = self.tick;
        let planet_state = self
            .planets
            .get_mut(&planet)
            .ok_or(EngineError::PlanetNotFound(planet))?;
        construction::commission(
            planet_state,
            &self.catalog,
            &self.research,
            building_type,
            field,
            now,
            tick,
            &mut self.events,
        )
    }

    /// Tear down a building, refunding 50% of its material cost.
    pub fn demolish(
        &mut self,
        planet: PlanetId,
        building: BuildingId,
    ) -> Result<(), EngineError> {
        let tick = self.tick;
        let planet_state = self
            .planets
            .get_mut(&planet)
            .ok_or(EngineError::PlanetNotFound(planet))?;
        construction::demolish(planet_state, &self.catalog, building, tick, &mut self.events)?;
        Ok(())
    }

    /// Begin researching an item for a player.
    pub fn start_research(
        &mut self,
        player: PlayerId,
        research: ResearchTypeId,
    ) -> Result<(), EngineError> {
        let now = self.clock.now();
        let tick = self.tick;
        let labs = self.active_lab_count(player);
        let (rates, _) = self.player_production_rates(player);
        self.research
            .start(&self.catalog, player, research, labs, &rates, now, tick)?;
        self.events.extend(self.research.drain_events());
        Ok(())
    }

    /// Cancel the player's in-progress research, discarding all progress.
    pub fn cancel_research(&mut self, player: PlayerId) -> Result<ResearchTypeId, EngineError> {
        Ok(self.research.cancel(player)?)
    }

    // -- Tick --

    /// Run one simulation tick at the current clock time.
    ///
    /// Re-invocation at the same timestamp is rejected with
    /// [`EngineError::TickAlreadyRan`], so a manual admin trigger cannot
    /// double-apply a scheduled slot. A planet with malformed catalog data
    /// is logged and skipped; the tick continues for every other planet.
    pub fn run_tick(&mut self) -> Result<TickReport, EngineError> {
        let now = self.clock.now();
        if self.last_tick_at == Some(now) {
            return Err(EngineError::TickAlreadyRan { at: now });
        }
        self.tick += 1;
        let tick = self.tick;

        let mut points: BTreeMap<PlayerId, Fixed64> = BTreeMap::new();
        let mut realized: BTreeMap<PlayerId, ResourceSet> = BTreeMap::new();
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for planet in self.planets.values_mut() {
            match tick_planet(
                planet,
                &self.catalog,
                now,
                tick,
                &mut self.events,
                &mut points,
                &mut realized,
            ) {
                Ok(()) => processed += 1,
                Err(fault) => {
                    log::warn!("skipping planet {:?} this tick: {fault}", planet.id);
                    skipped += 1;
                }
            }
        }

        // Research advances once per player, after every planet has been
        // credited: planet owners plus anyone with research in flight.
        let mut players: BTreeSet<PlayerId> =
            self.planets.values().map(|p| p.owner).collect();
        players.extend(self.research.active_players());
        for player in players {
            let player_points = points.get(&player).copied().unwrap_or(Fixed64::ZERO);
            let player_realized = realized.get(&player).cloned().unwrap_or_default();
            self.research.advance(
                &self.catalog,
                player,
                player_points,
                &player_realized,
                now,
                tick,
            );
        }
        self.events.extend(self.research.drain_events());

        self.last_tick_at = Some(now);
        Ok(TickReport {
            tick,
            at: now,
            planets_processed: processed,
            planets_skipped: skipped,
        })
    }

    /// Take all events emitted since the last drain. The transport
    /// collaborator relays them to clients.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // -- Queries --

    /// Aggregated production, consumption, storage, and energy across all of
    /// a player's planets.
    pub fn dashboard_summary(&self, player: PlayerId) -> Result<DashboardSummary, EngineError> {
        let owned: Vec<&Planet> = self
            .planets
            .values()
            .filter(|p| p.owner == player)
            .collect();
        if owned.is_empty() {
            return Err(EngineError::PlayerNotFound(player));
        }

        let (production, research_rate) = self.player_production_rates(player);
        let mut energy = EnergyBalance {
            production: Fixed64::ZERO,
            consumption: Fixed64::ZERO,
        };
        let mut stored = ResourceSet::new();
        let mut storage_capacity = Fixed64::ZERO;
        let mut energy_stored = Fixed64::ZERO;
        let mut energy_capacity = Fixed64::ZERO;

        for planet in &owned {
            let balance = outpost_energy::compute_balance(planet, &self.catalog);
            energy.production += balance.production;
            energy.consumption += balance.consumption;
            for (kind, amount) in planet.ledger.snapshot().iter() {
                stored.add(kind, amount);
            }
            storage_capacity += planet.ledger.storage_capacity();
            energy_stored += planet.ledger.energy();
            energy_capacity += planet.ledger.energy_capacity();
        }

        Ok(DashboardSummary {
            planets: owned.len(),
            production,
            research_rate,
            energy,
            stored,
            storage_capacity,
            energy_stored,
            energy_capacity,
        })
    }

    /// Every research item annotated with its status for the player.
    pub fn available_research(&self, player: PlayerId) -> Vec<ResearchOverview> {
        self.catalog
            .research_items()
            .map(|(id, spec)| ResearchOverview {
                research: id,
                name: spec.name.clone(),
                status: self.research.status(&self.catalog, player, id),
            })
            .collect()
    }

    // -- Internal aggregation --

    /// The player's count of online Research-category buildings.
    fn active_lab_count(&self, player: PlayerId) -> u32 {
        self.planets
            .values()
            .filter(|p| p.owner == player)
            .flat_map(|p| p.online_buildings())
            .filter(|(_, b)| {
                self.catalog
                    .building(b.building_type)
                    .is_some_and(|spec| spec.category == BuildingCategory::Research)
            })
            .count() as u32
    }

    /// Per-tick material production and research-point rate across the
    /// player's online buildings.
    fn player_production_rates(&self, player: PlayerId) -> (ResourceSet, Fixed64) {
        let mut rates = ResourceSet::new();
        let mut research_rate = Fixed64::ZERO;
        for planet in self.planets.values().filter(|p| p.owner == player) {
            for (_, instance) in planet.online_buildings() {
                let Some(spec) = self.catalog.building(instance.building_type) else {
                    continue;
                };
                let level = Fixed64::from_num(instance.level);
                for (kind, rate) in spec.production.iter() {
                    rates.add(kind, rate * level);
                }
                research_rate += spec.research_rate * level;
            }
        }
        (rates, research_rate)
    }
}

// ---------------------------------------------------------------------------
// Per-planet tick
// ---------------------------------------------------------------------------

/// The four ordered steps for one planet. A returned error means the
/// planet's data is malformed; the caller logs and skips it without
/// aborting the tick.
fn tick_planet(
    planet: &mut Planet,
    catalog: &Catalog,
    now: Timestamp,
    tick: Ticks,
    events: &mut EventQueue,
    points: &mut BTreeMap<PlayerId, Fixed64>,
    realized: &mut BTreeMap<PlayerId, ResourceSet>,
) -> Result<(), EngineError> {
    // Integrity guard: every instance must resolve against the catalog
    // before any state is touched.
    for instance in planet.buildings.values() {
        if catalog.building(instance.building_type).is_none() {
            return Err(EngineError::UnknownBuildingType(instance.building_type));
        }
    }

    // Step 1: energy balance, shedding, store update.
    events.extend(outpost_energy::tick(planet, catalog, tick));

    // Step 2: material production, in commission order, kinds in canonical
    // order. What actually fits in storage counts as realized production.
    let mut online: Vec<(u64, BuildingTypeId, u32)> = planet
        .online_buildings()
        .map(|(_, b)| (b.sequence, b.building_type, b.level))
        .collect();
    online.sort_by_key(|(sequence, _, _)| *sequence);

    let owner = planet.owner;
    for (_, building_type, level) in online {
        let spec = catalog
            .building(building_type)
            .ok_or(EngineError::UnknownBuildingType(building_type))?;
        let level = Fixed64::from_num(level);
        for (kind, rate) in spec.production.iter() {
            let amount = rate * level;
            let overflow = planet.ledger.credit(kind, amount)?;
            let credited = amount - overflow;
            if credited > Fixed64::ZERO {
                realized.entry(owner).or_default().add(kind, credited);
            }
        }
        if spec.research_rate > Fixed64::ZERO {
            *points.entry(owner).or_insert(Fixed64::ZERO) += spec.research_rate * level;
        }
    }
    events.push(Event::ResourcesUpdated {
        planet: planet.id,
        balances: planet.ledger.snapshot(),
        energy: planet.ledger.energy(),
        tick,
    });

    // Step 3: construction completion. Buildings finishing now join the
    // energy balance from the next tick.
    construction::complete_due(planet, catalog, now, tick, events);

    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
