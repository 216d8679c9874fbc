//! Cross-crate scenario tests driving the full colony engine headlessly:
//! catalog loading, construction, energy, production, research, and the
//! tick schedule working together.

use outpost_core::catalog::{
    BuildingCategory, BuildingSpec, CatalogBuilder, ResearchCategory, ResearchCost, ResearchSpec,
    Unlock,
};
use outpost_core::clock::{ManualClock, Timestamp};
use outpost_core::event::{Event, EventKind};
use outpost_core::fixed::Fixed64;
use outpost_core::id::{FieldId, PlayerId};
use outpost_core::resource::{ResourceKind, ResourceSet};
use outpost_core::test_utils::{fx, place_active};
use outpost_engine::schedule::TickSchedule;
use outpost_engine::{Colony, Command, CommandOutcome, EngineError};
use std::sync::Arc;

fn engine_with_default_catalog() -> (Colony, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Timestamp(0)));
    let catalog = outpost_data::default_catalog().unwrap();
    (Colony::new(catalog, Box::new(clock.clone())), clock)
}

/// Colonize a planet with banked resources and energy, ready to build.
fn funded_planet(colony: &mut Colony, owner: u32) -> outpost_core::id::PlanetId {
    let id = colony.colonize(
        PlayerId(owner),
        "Nerva Prime",
        16,
        fx(50_000.0),
        fx(1_000.0),
    );
    let planet = colony.planet_mut(id).unwrap();
    planet
        .ledger
        .credit(ResourceKind::Credits, fx(10_000.0))
        .unwrap();
    planet
        .ledger
        .credit(ResourceKind::Durastahl, fx(5_000.0))
        .unwrap();
    planet
        .ledger
        .credit(ResourceKind::Crystal, fx(2_000.0))
        .unwrap();
    planet.ledger.credit_energy(fx(500.0)).unwrap();
    id
}

// ---------------------------------------------------------------------------
// Test 1: colony lifecycle from commissioning to demolition
// ---------------------------------------------------------------------------
#[test]
fn colony_lifecycle() {
    let (mut colony, clock) = engine_with_default_catalog();
    let planet = funded_planet(&mut colony, 1);
    let catalog = colony.catalog();
    let command_center = catalog.building_id("Command Center").unwrap();
    let mine = catalog.building_id("Durastahl Mine").unwrap();
    let solar = catalog.building_id("Solar Array").unwrap();

    let cc = colony
        .start_construction(planet, command_center, FieldId(0))
        .unwrap();
    colony.start_construction(planet, mine, FieldId(1)).unwrap();
    colony
        .start_construction(planet, solar, FieldId(2))
        .unwrap();

    // Nothing is active before the build durations elapse.
    clock.set(Timestamp(300));
    colony.run_tick().unwrap();
    assert_eq!(colony.planet(planet).unwrap().active_buildings().count(), 0);

    // Solar (450s) and mine (600s) finish; the command center (1800s) is
    // still in progress.
    clock.set(Timestamp(700));
    colony.run_tick().unwrap();
    assert_eq!(colony.planet(planet).unwrap().active_buildings().count(), 2);

    // The next tick credits mine production and nets energy.
    let durastahl_before = colony
        .planet(planet)
        .unwrap()
        .ledger
        .balance(ResourceKind::Durastahl);
    clock.set(Timestamp(1_000));
    colony.run_tick().unwrap();
    let p = colony.planet(planet).unwrap();
    assert_eq!(
        p.ledger.balance(ResourceKind::Durastahl),
        durastahl_before + fx(40.0)
    );

    // Finish the command center too.
    clock.set(Timestamp(1_800));
    colony.run_tick().unwrap();
    assert_eq!(colony.planet(planet).unwrap().active_buildings().count(), 3);

    // Demolish it: exactly half of 600/500/100 comes back, the field frees.
    let credits_before = colony
        .planet(planet)
        .unwrap()
        .ledger
        .balance(ResourceKind::Credits);
    colony.demolish(planet, cc).unwrap();
    let p = colony.planet(planet).unwrap();
    assert_eq!(
        p.ledger.balance(ResourceKind::Credits),
        credits_before + fx(300.0)
    );
    assert!(!p.field_occupied(FieldId(0)));

    let events = colony.drain_events();
    let demolitions: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind() == EventKind::BuildingDemolished)
        .collect();
    assert_eq!(demolitions.len(), 1);
    match demolitions[0] {
        Event::BuildingDemolished { refund, .. } => {
            assert_eq!(refund.get(ResourceKind::Credits), fx(300.0));
            assert_eq!(refund.get(ResourceKind::Durastahl), fx(250.0));
            assert_eq!(refund.get(ResourceKind::Crystal), fx(50.0));
        }
        other => panic!("expected BuildingDemolished, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 2: threshold research completes after exactly the right tick count
// ---------------------------------------------------------------------------
#[test]
fn threshold_research_completes_on_third_tick() {
    // A dedicated catalog: one building producing exactly 50 durastahl per
    // tick, one research needing 150 cumulative units.
    let mut builder = CatalogBuilder::new();
    builder
        .register_building(BuildingSpec {
            name: "Ore Sifter".to_string(),
            category: BuildingCategory::Production,
            production: ResourceSet::of(&[(ResourceKind::Durastahl, fx(50.0))]),
            energy_production: fx(5.0),
            energy_upkeep: Fixed64::ZERO,
            research_rate: Fixed64::ZERO,
            build_cost: ResourceSet::of(&[(ResourceKind::Credits, fx(100.0))]),
            energy_cost_to_build: Fixed64::ZERO,
            build_time_secs: 60,
            unique_per_planet: false,
        })
        .unwrap();
    builder
        .register_research(ResearchSpec {
            name: "Alloy Plating".to_string(),
            category: ResearchCategory::Economy,
            tier: 1,
            prerequisite: None,
            required_labs: 0,
            cost: ResearchCost::ProductionThreshold {
                resource: ResourceKind::Durastahl,
                min_rate: fx(1.0),
                total: fx(150.0),
            },
            unlock: Unlock::Bonus {
                name: "armor".to_string(),
                percent: fx(10.0),
            },
        })
        .unwrap();
    let catalog = builder.build().unwrap();

    let clock = Arc::new(ManualClock::new(Timestamp(0)));
    let mut colony = Colony::new(catalog, Box::new(clock.clone()));
    let planet = colony.colonize(PlayerId(1), "Forge", 4, fx(100_000.0), fx(100.0));
    place_active(
        colony.planet_mut(planet).unwrap(),
        outpost_core::id::BuildingTypeId(0),
        FieldId(0),
        Timestamp(0),
    );

    let research = colony.catalog().research_id("Alloy Plating").unwrap();
    colony.start_research(PlayerId(1), research).unwrap();

    // 50 per tick against a 150 total: in progress after ticks one and two,
    // completed on the third.
    for tick in 1..=2 {
        clock.set(Timestamp(tick * 60));
        colony.run_tick().unwrap();
        let active = colony.research().active(PlayerId(1)).unwrap();
        assert_eq!(active.progress, fx(50.0 * tick as f64));
    }
    clock.set(Timestamp(180));
    colony.run_tick().unwrap();
    assert!(colony.research().is_completed(PlayerId(1), research));
    assert_eq!(
        colony.research().completed_at(PlayerId(1), research),
        Some(Timestamp(180))
    );

    let completions: Vec<Event> = colony
        .drain_events()
        .into_iter()
        .filter(|e| e.kind() == EventKind::ResearchCompleted)
        .collect();
    assert_eq!(completions.len(), 1);
}

// ---------------------------------------------------------------------------
// Test 3: capacity invariants hold over many production-heavy ticks
// ---------------------------------------------------------------------------
#[test]
fn capacity_invariants_over_many_ticks() {
    let (mut colony, clock) = engine_with_default_catalog();
    // A cramped warehouse: production will overflow quickly.
    let planet = colony.colonize(PlayerId(1), "Shoebox", 8, fx(500.0), fx(60.0));
    let ids: Vec<_> = ["Solar Array", "Durastahl Mine", "Crystal Refinery", "Trade Hub"]
        .iter()
        .map(|name| colony.catalog().building_id(name).unwrap())
        .collect();
    {
        let p = colony.planet_mut(planet).unwrap();
        for (i, id) in ids.into_iter().enumerate() {
            place_active(p, id, FieldId(i as u16), Timestamp(0));
        }
    }

    for tick in 1..=50 {
        clock.set(Timestamp(tick * 60));
        colony.run_tick().unwrap();
        let p = colony.planet(planet).unwrap();
        assert!(
            p.ledger.stored_total() <= p.ledger.storage_capacity(),
            "storage overflow at tick {tick}"
        );
        assert!(
            p.ledger.energy() <= p.ledger.energy_capacity(),
            "energy overflow at tick {tick}"
        );
        assert!(p.ledger.energy() >= Fixed64::ZERO);
        for kind in ResourceKind::ALL {
            assert!(p.ledger.balance(kind) >= Fixed64::ZERO);
        }
    }

    // The warehouse is pinned at capacity, not beyond it.
    let p = colony.planet(planet).unwrap();
    assert_eq!(p.ledger.stored_total(), fx(500.0));
}

// ---------------------------------------------------------------------------
// Test 4: energy shortfall and recovery, end to end
// ---------------------------------------------------------------------------
#[test]
fn energy_shortfall_and_recovery() {
    let (mut colony, clock) = engine_with_default_catalog();
    let planet = funded_planet(&mut colony, 1);
    let mine = colony.catalog().building_id("Durastahl Mine").unwrap();
    let solar = colony.catalog().building_id("Solar Array").unwrap();

    // Drain the banked energy so the mine has nothing to run on once built.
    colony.start_construction(planet, mine, FieldId(0)).unwrap();
    {
        let p = colony.planet_mut(planet).unwrap();
        let stored = p.ledger.energy();
        p.ledger.debit_energy(stored).unwrap();
    }

    clock.set(Timestamp(600));
    colony.run_tick().unwrap(); // mine completes
    clock.set(Timestamp(660));
    colony.run_tick().unwrap(); // and immediately browns out

    let events = colony.drain_events();
    assert!(
        events
            .iter()
            .any(|e| e.kind() == EventKind::EnergyShortfall)
    );
    // No durastahl was produced while offline.
    let p = colony.planet(planet).unwrap();
    assert_eq!(p.ledger.balance(ResourceKind::Durastahl), fx(5_000.0));

    // A solar array restores the grid.
    colony
        .start_construction(planet, solar, FieldId(1))
        .unwrap();
    clock.set(Timestamp(660 + 450));
    colony.run_tick().unwrap(); // solar completes
    clock.set(Timestamp(660 + 450 + 60));
    colony.run_tick().unwrap(); // grid recovers, mine produces again

    let events = colony.drain_events();
    assert!(events.iter().any(|e| e.kind() == EventKind::EnergyRestored));
    // 5000 banked, minus 80 for the solar array's cost, plus one tick of
    // mine output.
    let p = colony.planet(planet).unwrap();
    assert_eq!(p.ledger.balance(ResourceKind::Durastahl), fx(4_960.0));
}

// ---------------------------------------------------------------------------
// Test 5: research unlock gates construction
// ---------------------------------------------------------------------------
#[test]
fn research_unlocks_fusion_plant() {
    let (mut colony, clock) = engine_with_default_catalog();
    let planet = funded_planet(&mut colony, 1);
    let fusion = colony.catalog().building_id("Fusion Plant").unwrap();
    let lab = colony.catalog().building_id("Research Lab").unwrap();
    let solar = colony.catalog().building_id("Solar Array").unwrap();
    let energy_cells = colony.catalog().research_id("Energy Cells").unwrap();

    // Locked until Energy Cells completes.
    let result = colony.start_construction(planet, fusion, FieldId(0));
    assert!(matches!(
        result,
        Err(EngineError::BuildingNotUnlocked { .. })
    ));

    // One powered lab produces 10 points per tick; Energy Cells needs 100.
    {
        let p = colony.planet_mut(planet).unwrap();
        place_active(p, solar, FieldId(1), Timestamp(0));
        place_active(p, lab, FieldId(2), Timestamp(0));
    }
    colony.start_research(PlayerId(1), energy_cells).unwrap();
    for tick in 1..=10 {
        clock.set(Timestamp(tick * 60));
        colony.run_tick().unwrap();
    }
    assert!(colony.research().is_completed(PlayerId(1), energy_cells));

    // Unlocked now.
    colony
        .start_construction(planet, fusion, FieldId(0))
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test 6: the wall-clock schedule drives idempotent ticks
// ---------------------------------------------------------------------------
#[test]
fn scheduled_ticks_are_idempotent() {
    let (mut colony, clock) = engine_with_default_catalog();
    funded_planet(&mut colony, 1);
    let schedule = TickSchedule::standard(0);

    // Walk one simulated day of scheduled slots.
    let mut at = Timestamp(0);
    for _ in 0..5 {
        at = schedule.next_tick_after(at).unwrap();
        clock.set(at);
        let outcome = colony.execute(Command::RunTick).unwrap();
        assert!(matches!(outcome, CommandOutcome::TickCompleted(_)));

        // An eager admin re-firing the same slot is rejected cleanly.
        let retry = colony.execute(Command::RunTick);
        assert!(matches!(retry, Err(EngineError::TickAlreadyRan { .. })));
    }
    assert_eq!(colony.current_tick(), 5);
}
