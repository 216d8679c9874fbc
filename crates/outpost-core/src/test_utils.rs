//! Shared fixtures for tests across the workspace.
//!
//! Provides a small standard catalog, planet constructors, and shortcuts for
//! placing already-active buildings without going through the construction
//! flow.

use crate::building::{BuildingInstance, BuildingState};
use crate::catalog::{
    BuildingCategory, BuildingSpec, Catalog, CatalogBuilder, ResearchCategory, ResearchCost,
    ResearchSpec, Unlock,
};
use crate::clock::Timestamp;
use crate::fixed::Fixed64;
use crate::id::{BuildingId, BuildingTypeId, FieldId, PlanetId, PlayerId, ResearchTypeId, ShipTypeId};
use crate::planet::Planet;
use crate::resource::{ResourceKind, ResourceSet};

/// Shorthand fixed-point constructor.
pub fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// -- Standard catalog IDs (registration order in `catalog()`) --

pub fn command_center() -> BuildingTypeId {
    BuildingTypeId(0)
}
pub fn durastahl_mine() -> BuildingTypeId {
    BuildingTypeId(1)
}
pub fn crystal_refinery() -> BuildingTypeId {
    BuildingTypeId(2)
}
pub fn solar_array() -> BuildingTypeId {
    BuildingTypeId(3)
}
pub fn research_lab() -> BuildingTypeId {
    BuildingTypeId(4)
}
pub fn fusion_plant() -> BuildingTypeId {
    BuildingTypeId(5)
}

pub fn energy_cells() -> ResearchTypeId {
    ResearchTypeId(0)
}
pub fn durastahl_alloys() -> ResearchTypeId {
    ResearchTypeId(1)
}
pub fn hyperdrive() -> ResearchTypeId {
    ResearchTypeId(2)
}

/// A compact catalog exercising every building category and both research
/// cost models.
pub fn catalog() -> Catalog {
    let mut builder = CatalogBuilder::new();

    builder
        .register_building(BuildingSpec {
            name: "Command Center".to_string(),
            category: BuildingCategory::Command,
            production: ResourceSet::of(&[(ResourceKind::Credits, fx(10.0))]),
            energy_production: Fixed64::ZERO,
            energy_upkeep: fx(5.0),
            research_rate: Fixed64::ZERO,
            build_cost: ResourceSet::of(&[
                (ResourceKind::Credits, fx(600.0)),
                (ResourceKind::Durastahl, fx(500.0)),
                (ResourceKind::Crystal, fx(100.0)),
            ]),
            energy_cost_to_build: fx(50.0),
            build_time_secs: 1_800,
            unique_per_planet: true,
        })
        .unwrap();

    builder
        .register_building(BuildingSpec {
            name: "Durastahl Mine".to_string(),
            category: BuildingCategory::Production,
            production: ResourceSet::of(&[(ResourceKind::Durastahl, fx(40.0))]),
            energy_production: Fixed64::ZERO,
            energy_upkeep: fx(10.0),
            research_rate: Fixed64::ZERO,
            build_cost: ResourceSet::of(&[(ResourceKind::Credits, fx(200.0))]),
            energy_cost_to_build: fx(20.0),
            build_time_secs: 600,
            unique_per_planet: false,
        })
        .unwrap();

    builder
        .register_building(BuildingSpec {
            name: "Crystal Refinery".to_string(),
            category: BuildingCategory::Production,
            production: ResourceSet::of(&[(ResourceKind::Crystal, fx(25.0))]),
            energy_production: Fixed64::ZERO,
            energy_upkeep: fx(12.0),
            research_rate: Fixed64::ZERO,
            build_cost: ResourceSet::of(&[
                (ResourceKind::Credits, fx(250.0)),
                (ResourceKind::Durastahl, fx(100.0)),
            ]),
            energy_cost_to_build: fx(25.0),
            build_time_secs: 900,
            unique_per_planet: false,
        })
        .unwrap();

    builder
        .register_building(BuildingSpec {
            name: "Solar Array".to_string(),
            category: BuildingCategory::Energy,
            production: ResourceSet::new(),
            energy_production: fx(40.0),
            energy_upkeep: Fixed64::ZERO,
            research_rate: Fixed64::ZERO,
            build_cost: ResourceSet::of(&[
                (ResourceKind::Credits, fx(150.0)),
                (ResourceKind::Durastahl, fx(80.0)),
            ]),
            energy_cost_to_build: Fixed64::ZERO,
            build_time_secs: 450,
            unique_per_planet: false,
        })
        .unwrap();

    builder
        .register_building(BuildingSpec {
            name: "Research Lab".to_string(),
            category: BuildingCategory::Research,
            production: ResourceSet::new(),
            energy_production: Fixed64::ZERO,
            energy_upkeep: fx(8.0),
            research_rate: fx(10.0),
            build_cost: ResourceSet::of(&[
                (ResourceKind::Credits, fx(300.0)),
                (ResourceKind::Crystal, fx(50.0)),
            ]),
            energy_cost_to_build: fx(30.0),
            build_time_secs: 1_200,
            unique_per_planet: false,
        })
        .unwrap();

    builder
        .register_building(BuildingSpec {
            name: "Fusion Plant".to_string(),
            category: BuildingCategory::Energy,
            production: ResourceSet::new(),
            energy_production: fx(150.0),
            energy_upkeep: Fixed64::ZERO,
            research_rate: Fixed64::ZERO,
            build_cost: ResourceSet::of(&[
                (ResourceKind::Credits, fx(800.0)),
                (ResourceKind::Durastahl, fx(400.0)),
                (ResourceKind::Crystal, fx(200.0)),
            ]),
            energy_cost_to_build: fx(40.0),
            build_time_secs: 3_600,
            unique_per_planet: false,
        })
        .unwrap();

    builder
        .register_research(ResearchSpec {
            name: "Energy Cells".to_string(),
            category: ResearchCategory::Science,
            tier: 1,
            prerequisite: None,
            required_labs: 1,
            cost: ResearchCost::Points { total: fx(100.0) },
            unlock: Unlock::Building(fusion_plant()),
        })
        .unwrap();

    builder
        .register_research(ResearchSpec {
            name: "Durastahl Alloys".to_string(),
            category: ResearchCategory::Economy,
            tier: 1,
            prerequisite: None,
            required_labs: 1,
            cost: ResearchCost::ProductionThreshold {
                resource: ResourceKind::Durastahl,
                min_rate: fx(20.0),
                total: fx(5_000.0),
            },
            unlock: Unlock::Bonus {
                name: "defense".to_string(),
                percent: fx(15.0),
            },
        })
        .unwrap();

    builder
        .register_research(ResearchSpec {
            name: "Hyperdrive".to_string(),
            category: ResearchCategory::Propulsion,
            tier: 2,
            prerequisite: Some(energy_cells()),
            required_labs: 2,
            cost: ResearchCost::Points { total: fx(500.0) },
            unlock: Unlock::Ship(ShipTypeId(1)),
        })
        .unwrap();

    builder.build().unwrap()
}

/// A planet with room to build and generous caps.
pub fn colony_planet() -> Planet {
    Planet::new(
        PlanetId(1),
        PlayerId(1),
        "Nerva Prime",
        12,
        fx(10_000.0),
        fx(500.0),
    )
}

/// Insert an already-active, online building, bypassing construction.
/// Useful for ledger and energy tests that start mid-game.
pub fn place_active(
    planet: &mut Planet,
    building_type: BuildingTypeId,
    field: FieldId,
    completed_at: Timestamp,
) -> BuildingId {
    let sequence = planet.next_sequence();
    let mut instance =
        BuildingInstance::commissioned(building_type, field, sequence, completed_at);
    instance.state = BuildingState::Active {
        completed_at,
        online: true,
    };
    planet.buildings.insert(instance)
}
