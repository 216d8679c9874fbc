//! Energy balance subsystem for the colony engine.
//!
//! Each tick, a planet's active buildings produce and consume energy. This
//! module computes the balance, decides which buildings stay powered, applies
//! the net to the planet's bounded energy store, and emits shortfall events
//! on state transitions.
//!
//! # Design
//!
//! - Buildings under construction contribute neither production nor
//!   consumption.
//! - Every active building starts the tick online; if the store cannot cover
//!   the deficit, net-consuming buildings are taken offline newest-first
//!   (highest commission sequence) until the store can. The order is a
//!   deterministic policy, chosen so that established infrastructure keeps
//!   running when a new building overdraws the grid.
//! - A building taken offline stops producing as well as consuming, and it
//!   produces no materials this tick either (the credit pass reads the
//!   online flag).
//! - Events fire only on *transitions* between powered and shortfall states,
//!   not every tick.

use outpost_core::catalog::{BuildingSpec, Catalog};
use outpost_core::event::Event;
use outpost_core::fixed::{Fixed64, Ticks};
use outpost_core::planet::Planet;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

/// A planet's energy production and consumption for one tick, summed over
/// the buildings that are currently online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// Total energy produced per tick.
    pub production: Fixed64,
    /// Total upkeep drawn per tick.
    pub consumption: Fixed64,
}

impl EnergyBalance {
    /// Net energy change per tick: production minus consumption.
    pub fn net(&self) -> Fixed64 {
        self.production - self.consumption
    }
}

/// Per-level rate scaled by an instance's level.
fn scaled(rate: Fixed64, level: u32) -> Fixed64 {
    rate * Fixed64::from_num(level)
}

/// Energy drawn minus energy produced for one instance. Positive for net
/// consumers.
fn net_draw(spec: &BuildingSpec, level: u32) -> Fixed64 {
    scaled(spec.energy_upkeep, level) - scaled(spec.energy_production, level)
}

/// Compute the energy balance over a planet's online buildings.
pub fn compute_balance(planet: &Planet, catalog: &Catalog) -> EnergyBalance {
    let mut production = Fixed64::ZERO;
    let mut consumption = Fixed64::ZERO;
    for (_, instance) in planet.online_buildings() {
        let Some(spec) = catalog.building(instance.building_type) else {
            continue;
        };
        production += scaled(spec.energy_production, instance.level);
        consumption += scaled(spec.energy_upkeep, instance.level);
    }
    EnergyBalance {
        production,
        consumption,
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Advance a planet's energy state by one tick.
///
/// 1. Mark every active building online.
/// 2. While the store cannot absorb the net deficit, take the newest online
///    net consumer offline.
/// 3. Apply the resulting net to the store, clamped to
///    `[0, energy_capacity]`.
/// 4. Emit [`Event::EnergyShortfall`] / [`Event::EnergyRestored`] on
///    transitions.
///
/// Returns the events emitted this tick.
pub fn tick(planet: &mut Planet, catalog: &Catalog, current_tick: Ticks) -> Vec<Event> {
    // Step 1: everything active starts the tick powered.
    for instance in planet.buildings.values_mut() {
        instance.set_online(true);
    }

    // Step 2: shed newest net consumers until the store covers the balance.
    // Each round removes one net consumer, so when none remain the net is
    // non-negative and the loop has terminated.
    loop {
        let balance = compute_balance(planet, catalog);
        if planet.ledger.energy() + balance.net() >= Fixed64::ZERO {
            break;
        }

        let victim = planet
            .online_buildings()
            .filter(|(_, b)| {
                catalog
                    .building(b.building_type)
                    .is_some_and(|spec| net_draw(spec, b.level) > Fixed64::ZERO)
            })
            .max_by_key(|(_, b)| b.sequence)
            .map(|(id, _)| id);

        match victim {
            Some(id) => {
                if let Some(instance) = planet.buildings.get_mut(id) {
                    instance.set_online(false);
                }
            }
            None => break,
        }
    }

    // Step 3: apply the net to the bounded store.
    let balance = compute_balance(planet, catalog);
    planet.ledger.apply_energy_delta(balance.net());

    // Step 4: transition events only.
    let mut deficit = Fixed64::ZERO;
    for (_, instance) in planet.active_buildings() {
        if !instance.is_online()
            && let Some(spec) = catalog.building(instance.building_type)
        {
            deficit += scaled(spec.energy_upkeep, instance.level);
        }
    }
    let in_shortfall = deficit > Fixed64::ZERO;

    let mut events = Vec::new();
    if in_shortfall && !planet.energy_shortfall {
        planet.energy_shortfall = true;
        events.push(Event::EnergyShortfall {
            planet: planet.id,
            deficit,
            tick: current_tick,
        });
    } else if !in_shortfall && planet.energy_shortfall {
        planet.energy_shortfall = false;
        events.push(Event::EnergyRestored {
            planet: planet.id,
            tick: current_tick,
        });
    }

    events
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::clock::Timestamp;
    use outpost_core::id::FieldId;
    use outpost_core::test_utils::{
        catalog, colony_planet, command_center, crystal_refinery, durastahl_mine, fx,
        place_active, solar_array,
    };

    // -----------------------------------------------------------------------
    // Test 1: balanced planet — net applied to the store
    // -----------------------------------------------------------------------
    #[test]
    fn surplus_charges_the_store() {
        let cat = catalog();
        let mut planet = colony_planet();
        // Solar array: +40. Mine: -10. Net +30 per tick.
        place_active(&mut planet, solar_array(), FieldId(0), Timestamp(0));
        place_active(&mut planet, durastahl_mine(), FieldId(1), Timestamp(0));

        let events = tick(&mut planet, &cat, 1);
        assert!(events.is_empty());
        assert_eq!(planet.ledger.energy(), fx(30.0));

        tick(&mut planet, &cat, 2);
        assert_eq!(planet.ledger.energy(), fx(60.0));
    }

    // -----------------------------------------------------------------------
    // Test 2: the store is clamped at its capacity
    // -----------------------------------------------------------------------
    #[test]
    fn store_clamps_at_capacity() {
        let cat = catalog();
        let mut planet = colony_planet();
        place_active(&mut planet, solar_array(), FieldId(0), Timestamp(0));

        // 500 capacity, +40 per tick: 13 ticks would be 520.
        for t in 1..=13 {
            tick(&mut planet, &cat, t);
        }
        assert_eq!(planet.ledger.energy(), fx(500.0));
    }

    // -----------------------------------------------------------------------
    // Test 3: the store drains before anything is shed
    // -----------------------------------------------------------------------
    #[test]
    fn store_covers_deficit_without_shedding() {
        let cat = catalog();
        let mut planet = colony_planet();
        planet.ledger.credit_energy(fx(100.0)).unwrap();
        // Mine only: -10 per tick, store covers ten ticks.
        place_active(&mut planet, durastahl_mine(), FieldId(0), Timestamp(0));

        let events = tick(&mut planet, &cat, 1);
        assert!(events.is_empty());
        assert_eq!(planet.ledger.energy(), fx(90.0));
        assert_eq!(planet.online_buildings().count(), 1);
    }

    // -----------------------------------------------------------------------
    // Test 4: newest consumer shed first when the store runs dry
    // -----------------------------------------------------------------------
    #[test]
    fn newest_consumer_is_shed_first() {
        let cat = catalog();
        let mut planet = colony_planet();
        // No stored energy, no producers: consumers cannot run.
        let old_mine = place_active(&mut planet, durastahl_mine(), FieldId(0), Timestamp(0));
        let new_refinery =
            place_active(&mut planet, crystal_refinery(), FieldId(1), Timestamp(0));
        planet.ledger.credit_energy(fx(10.0)).unwrap();

        let events = tick(&mut planet, &cat, 1);

        // The refinery (newer, sequence 1) goes offline; the mine's 10 upkeep
        // is covered by the stored 10.
        assert!(!planet.buildings[new_refinery].is_online());
        assert!(planet.buildings[old_mine].is_online());
        assert_eq!(planet.ledger.energy(), Fixed64::ZERO);

        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::EnergyShortfall { deficit, tick, .. } => {
                assert_eq!(*deficit, fx(12.0));
                assert_eq!(*tick, 1);
            }
            other => panic!("expected EnergyShortfall, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Test 5: shortfall event fires only on transition
    // -----------------------------------------------------------------------
    #[test]
    fn shortfall_event_fires_only_on_transition() {
        let cat = catalog();
        let mut planet = colony_planet();
        place_active(&mut planet, durastahl_mine(), FieldId(0), Timestamp(0));

        let events = tick(&mut planet, &cat, 1);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::EnergyShortfall { .. }));

        // Still unpowered on later ticks: no repeat event.
        assert!(tick(&mut planet, &cat, 2).is_empty());
        assert!(tick(&mut planet, &cat, 3).is_empty());
    }

    // -----------------------------------------------------------------------
    // Test 6: restored event fires when power returns
    // -----------------------------------------------------------------------
    #[test]
    fn restored_event_fires_on_recovery() {
        let cat = catalog();
        let mut planet = colony_planet();
        let mine = place_active(&mut planet, durastahl_mine(), FieldId(0), Timestamp(0));

        let events = tick(&mut planet, &cat, 1);
        assert!(matches!(events[0], Event::EnergyShortfall { .. }));

        // A solar array comes online; next tick everything is powered again.
        place_active(&mut planet, solar_array(), FieldId(1), Timestamp(0));
        let events = tick(&mut planet, &cat, 2);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::EnergyRestored { .. }));
        assert!(planet.buildings[mine].is_online());

        assert!(tick(&mut planet, &cat, 3).is_empty());
    }

    // -----------------------------------------------------------------------
    // Test 7: construction sites contribute nothing
    // -----------------------------------------------------------------------
    #[test]
    fn construction_sites_contribute_nothing() {
        let cat = catalog();
        let mut planet = colony_planet();
        place_active(&mut planet, solar_array(), FieldId(0), Timestamp(0));

        // A refinery still under construction must not draw upkeep.
        let seq = planet.next_sequence();
        planet.buildings.insert(
            outpost_core::building::BuildingInstance::commissioned(
                crystal_refinery(),
                FieldId(1),
                seq,
                Timestamp(0),
            ),
        );

        let balance = {
            tick(&mut planet, &cat, 1);
            compute_balance(&planet, &cat)
        };
        assert_eq!(balance.production, fx(40.0));
        assert_eq!(balance.consumption, Fixed64::ZERO);
        assert_eq!(planet.ledger.energy(), fx(40.0));
    }

    // -----------------------------------------------------------------------
    // Test 8: shed buildings come back automatically when power allows
    // -----------------------------------------------------------------------
    #[test]
    fn shed_buildings_recover_next_tick() {
        let cat = catalog();
        let mut planet = colony_planet();
        let mine = place_active(&mut planet, durastahl_mine(), FieldId(0), Timestamp(0));

        tick(&mut planet, &cat, 1);
        assert!(!planet.buildings[mine].is_online());

        // Stored energy appears (e.g. from a neighbor tick crediting it).
        planet.ledger.credit_energy(fx(50.0)).unwrap();
        tick(&mut planet, &cat, 2);
        assert!(planet.buildings[mine].is_online());
        assert_eq!(planet.ledger.energy(), fx(40.0));
    }

    // -----------------------------------------------------------------------
    // Test 9: producers are never shed
    // -----------------------------------------------------------------------
    #[test]
    fn producers_are_never_shed() {
        let cat = catalog();
        let mut planet = colony_planet();
        let solar = place_active(&mut planet, solar_array(), FieldId(0), Timestamp(0));
        // Five refineries: 60 upkeep vs 40 production, nothing stored.
        for i in 1..=5 {
            place_active(&mut planet, crystal_refinery(), FieldId(i), Timestamp(0));
        }

        tick(&mut planet, &cat, 1);

        assert!(planet.buildings[solar].is_online());
        // 40 production supports three refineries (36 upkeep), not four.
        let online_refineries = planet
            .online_buildings()
            .filter(|(id, _)| *id != solar)
            .count();
        assert_eq!(online_refineries, 3);
    }

    // -----------------------------------------------------------------------
    // Test 10: net producers with upkeep count both sides
    // -----------------------------------------------------------------------
    #[test]
    fn command_center_counts_both_sides() {
        let cat = catalog();
        let mut planet = colony_planet();
        place_active(&mut planet, command_center(), FieldId(0), Timestamp(0));
        place_active(&mut planet, solar_array(), FieldId(1), Timestamp(0));

        tick(&mut planet, &cat, 1);
        let balance = compute_balance(&planet, &cat);
        assert_eq!(balance.production, fx(40.0));
        assert_eq!(balance.consumption, fx(5.0));
        assert_eq!(planet.ledger.energy(), fx(35.0));
    }
}
