//! Construction state machine.
//!
//! A building moves `UnderConstruction -> Active` once its build duration
//! elapses; `Demolished` is reachable from either state. Commissioning
//! validates the request in a fixed order and debits both the material cost
//! and the one-time energy reservation atomically: if any check fails,
//! nothing has been deducted.

use crate::error::EngineError;
use outpost_core::building::{BuildingInstance, BuildingState};
use outpost_core::catalog::Catalog;
use outpost_core::clock::Timestamp;
use outpost_core::event::{Event, EventQueue};
use outpost_core::fixed::{Fixed64, Ticks};
use outpost_core::id::{BuildingId, BuildingTypeId, FieldId};
use outpost_core::planet::Planet;
use outpost_core::resource::ResourceSet;
use outpost_research::ResearchLedger;

/// Commission a new building on a vacant field.
///
/// Checks, in order: the building type exists, required research (if the
/// type is unlocked by research) is completed, the field is on the grid and
/// vacant, the single-instance rule, the full material cost, and the energy
/// reservation. Costs are only deducted once every check has passed.
pub fn commission(
    planet: &mut Planet,
    catalog: &Catalog,
    research: &ResearchLedger,
    building_type: BuildingTypeId,
    field: FieldId,
    now: Timestamp,
    tick: Ticks,
    events: &mut EventQueue,
) -> Result<BuildingId, EngineError> {
    let spec = catalog
        .building(building_type)
        .ok_or(EngineError::UnknownBuildingType(building_type))?;

    if let Some(required) = catalog.required_research_for_building(building_type)
        && !research.is_completed(planet.owner, required)
    {
        return Err(EngineError::BuildingNotUnlocked {
            building: building_type,
            research: required,
        });
    }

    if !planet.field_in_range(field) {
        return Err(EngineError::FieldOutOfRange(field));
    }
    if planet.field_occupied(field) {
        return Err(EngineError::FieldOccupied(field));
    }
    if spec.unique_per_planet
        && planet
            .buildings
            .values()
            .any(|b| b.building_type == building_type)
    {
        return Err(EngineError::SingleInstanceViolation(building_type));
    }

    // Verify both debits before committing either, so a failure half-way
    // cannot leave a partial deduction.
    planet.ledger.check_debit_all(&spec.build_cost)?;
    planet.ledger.check_debit_energy(spec.energy_cost_to_build)?;
    planet.ledger.debit_all(&spec.build_cost)?;
    planet.ledger.debit_energy(spec.energy_cost_to_build)?;

    let sequence = planet.next_sequence();
    let building = planet.buildings.insert(BuildingInstance::commissioned(
        building_type,
        field,
        sequence,
        now,
    ));
    events.push(Event::BuildingCommissioned {
        planet: planet.id,
        building,
        building_type,
        tick,
    });
    Ok(building)
}

/// Activate every commissioned building whose build duration has elapsed.
///
/// A building is under construction for all times in
/// `[started_at, started_at + build_time)` and active from
/// `started_at + build_time` onward. Energy gating applies from the next
/// tick; the completing building neither produced nor consumed this tick.
pub fn complete_due(
    planet: &mut Planet,
    catalog: &Catalog,
    now: Timestamp,
    tick: Ticks,
    events: &mut EventQueue,
) {
    let due: Vec<BuildingId> = planet
        .buildings
        .iter()
        .filter_map(|(id, instance)| match instance.state {
            BuildingState::UnderConstruction { started_at } => {
                let build_time = catalog
                    .building(instance.building_type)
                    .map(|spec| spec.build_time_secs as i64)?;
                (now.seconds_since(started_at) >= build_time).then_some(id)
            }
            _ => None,
        })
        .collect();

    for id in due {
        if let Some(instance) = planet.buildings.get_mut(id) {
            instance.state = BuildingState::Active {
                completed_at: now,
                online: true,
            };
            events.push(Event::BuildingCompleted {
                planet: planet.id,
                building: id,
                tick,
            });
        }
    }
}

/// Tear down a building, refunding half of its original material cost.
///
/// Allowed from both `UnderConstruction` and `Active` at the same 50% rate;
/// the energy reservation is never refunded. The refund is credited through
/// the normal capacity clamp, so a full warehouse swallows part of it. The
/// field is freed immediately.
pub fn demolish(
    planet: &mut Planet,
    catalog: &Catalog,
    building: BuildingId,
    tick: Ticks,
    events: &mut EventQueue,
) -> Result<ResourceSet, EngineError> {
    let instance = planet
        .buildings
        .get_mut(building)
        .ok_or(EngineError::BuildingNotFound(building))?;
    let spec = catalog
        .building(instance.building_type)
        .ok_or(EngineError::UnknownBuildingType(instance.building_type))?;

    let refund = spec.build_cost.scaled(Fixed64::from_num(0.5));
    instance.state = BuildingState::Demolished;
    planet.buildings.remove(building);

    planet.ledger.credit_all(&refund)?;
    events.push(Event::BuildingDemolished {
        planet: planet.id,
        building,
        refund: refund.clone(),
        tick,
    });
    Ok(refund)
}

// ===========================================================================
// Tests
// ===========================================================================
