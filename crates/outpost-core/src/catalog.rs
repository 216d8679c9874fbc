//! Immutable catalog of building and research definitions.
//!
//! Definitions are registered through a [`CatalogBuilder`] at startup and
//! frozen into a [`Catalog`] before the first tick. Registration order
//! assigns IDs, and a research prerequisite must already be registered when
//! it is referenced, so prerequisite chains cannot form cycles.

use crate::fixed::Fixed64;
use crate::id::{BuildingTypeId, ResearchTypeId, ShipTypeId};
use crate::resource::{ResourceKind, ResourceSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Building definitions
// ---------------------------------------------------------------------------

/// Broad role of a building. The `Command` category carries the one-per-planet
/// rule; `Research` buildings are the labs counted for research gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingCategory {
    Command,
    Production,
    Energy,
    Research,
    Storage,
}

/// A building definition. All rates are per level per tick; costs are
/// one-time. Immutable after catalog build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Human-readable name, unique within the catalog.
    pub name: String,

    /// Broad role of the building.
    pub category: BuildingCategory,

    /// Material output per level per tick.
    pub production: ResourceSet,

    /// Energy output per level per tick.
    pub energy_production: Fixed64,

    /// Energy drawn per level per tick while operating.
    pub energy_upkeep: Fixed64,

    /// Research points contributed per level per tick. Normally nonzero only
    /// for `Research` buildings.
    pub research_rate: Fixed64,

    /// One-time material cost, debited in full at commissioning.
    pub build_cost: ResourceSet,

    /// One-time energy reservation, debited from the energy store at
    /// commissioning. Distinct from `energy_upkeep`.
    pub energy_cost_to_build: Fixed64,

    /// Construction duration in seconds.
    pub build_time_secs: u64,

    /// Whether at most one instance may exist per planet.
    pub unique_per_planet: bool,
}

// ---------------------------------------------------------------------------
// Research definitions
// ---------------------------------------------------------------------------

/// Grouping used by bonus queries and the player-facing research tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchCategory {
    Military,
    Propulsion,
    Economy,
    Science,
}

/// How a research item's target is reached. Exactly one model per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResearchCost {
    /// Accumulate abstract research points produced by labs.
    Points { total: Fixed64 },

    /// Accumulate realized production of one material. `min_rate` is the
    /// gate checked at start time: below it the research could never finish.
    ProductionThreshold {
        resource: ResourceKind,
        min_rate: Fixed64,
        total: Fixed64,
    },
}

impl ResearchCost {
    /// The accumulation target for this cost model.
    pub fn target(&self) -> Fixed64 {
        match self {
            ResearchCost::Points { total } => *total,
            ResearchCost::ProductionThreshold { total, .. } => *total,
        }
    }
}

/// What completing a research item grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Unlock {
    /// Allows commissioning a building type.
    Building(BuildingTypeId),

    /// Allows a ship design at the shipyard. Opaque to this engine.
    Ship(ShipTypeId),

    /// A named percentage bonus (e.g. "defense", +15) that other subsystems
    /// query by name.
    Bonus { name: String, percent: Fixed64 },
}

/// A research definition. Immutable after catalog build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSpec {
    /// Human-readable name, unique within the catalog.
    pub name: String,

    /// Grouping for bonus queries and display.
    pub category: ResearchCategory,

    /// Depth in the research tree, for display ordering.
    pub tier: u8,

    /// Research that must be completed first, if any. Chains only; the
    /// builder rejects references to unregistered items, which keeps the
    /// graph acyclic by construction.
    pub prerequisite: Option<ResearchTypeId>,

    /// Active Research-category buildings the player must own.
    pub required_labs: u32,

    /// How the target is reached.
    pub cost: ResearchCost,

    /// What completion grants.
    pub unlock: Unlock,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while assembling or freezing a catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("research '{research}' references unregistered prerequisite {prerequisite:?}")]
    UnknownPrerequisite {
        research: String,
        prerequisite: ResearchTypeId,
    },

    #[error("research '{research}' unlocks unregistered building {building:?}")]
    UnknownUnlockBuilding {
        research: String,
        building: BuildingTypeId,
    },

    #[error("negative {field} in '{name}'")]
    NegativeValue { name: String, field: &'static str },

    #[error("zero build time in '{0}'")]
    ZeroBuildTime(String),
}

// ---------------------------------------------------------------------------
// CatalogBuilder
// ---------------------------------------------------------------------------

/// Builder for an immutable [`Catalog`]. Register everything, then `build()`.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    buildings: Vec<BuildingSpec>,
    building_names: HashMap<String, BuildingTypeId>,
    research: Vec<ResearchSpec>,
    research_names: HashMap<String, ResearchTypeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a building definition. Returns its ID.
    pub fn register_building(
        &mut self,
        spec: BuildingSpec,
    ) -> Result<BuildingTypeId, CatalogError> {
        if self.building_names.contains_key(&spec.name) {
            return Err(CatalogError::DuplicateName(spec.name));
        }
        let id = BuildingTypeId(self.buildings.len() as u32);
        self.building_names.insert(spec.name.clone(), id);
        self.buildings.push(spec);
        Ok(id)
    }

    /// Register a research definition. The prerequisite, if any, must already
    /// be registered. Returns its ID.
    pub fn register_research(
        &mut self,
        spec: ResearchSpec,
    ) -> Result<ResearchTypeId, CatalogError> {
        if self.research_names.contains_key(&spec.name) {
            return Err(CatalogError::DuplicateName(spec.name));
        }
        if let Some(prereq) = spec.prerequisite
            && prereq.0 as usize >= self.research.len()
        {
            return Err(CatalogError::UnknownPrerequisite {
                research: spec.name,
                prerequisite: prereq,
            });
        }
        if let Unlock::Building(building) = &spec.unlock
            && building.0 as usize >= self.buildings.len()
        {
            return Err(CatalogError::UnknownUnlockBuilding {
                building: *building,
                research: spec.name,
            });
        }
        let id = ResearchTypeId(self.research.len() as u32);
        self.research_names.insert(spec.name.clone(), id);
        self.research.push(spec);
        Ok(id)
    }

    /// Lookup a building ID by name.
    pub fn building_id(&self, name: &str) -> Option<BuildingTypeId> {
        self.building_names.get(name).copied()
    }

    /// Lookup a research ID by name.
    pub fn research_id(&self, name: &str) -> Option<ResearchTypeId> {
        self.research_names.get(name).copied()
    }

    /// Validate every definition and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for spec in &self.buildings {
            if spec.production.has_negative() || spec.build_cost.has_negative() {
                return Err(CatalogError::NegativeValue {
                    name: spec.name.clone(),
                    field: "resource amount",
                });
            }
            for (value, field) in [
                (spec.energy_production, "energy_production"),
                (spec.energy_upkeep, "energy_upkeep"),
                (spec.research_rate, "research_rate"),
                (spec.energy_cost_to_build, "energy_cost_to_build"),
            ] {
                if value < Fixed64::ZERO {
                    return Err(CatalogError::NegativeValue {
                        name: spec.name.clone(),
                        field,
                    });
                }
            }
            if spec.build_time_secs == 0 {
                return Err(CatalogError::ZeroBuildTime(spec.name.clone()));
            }
        }
        for spec in &self.research {
            let (min_rate, total) = match &spec.cost {
                ResearchCost::Points { total } => (Fixed64::ZERO, *total),
                ResearchCost::ProductionThreshold {
                    min_rate, total, ..
                } => (*min_rate, *total),
            };
            if min_rate < Fixed64::ZERO || total < Fixed64::ZERO {
                return Err(CatalogError::NegativeValue {
                    name: spec.name.clone(),
                    field: "research cost",
                });
            }
        }

        Ok(Catalog {
            buildings: self.buildings,
            building_names: self.building_names,
            research: self.research,
            research_names: self.research_names,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Frozen registry of building and research definitions. Read-only reference
/// data for the lifetime of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    buildings: Vec<BuildingSpec>,
    building_names: HashMap<String, BuildingTypeId>,
    research: Vec<ResearchSpec>,
    research_names: HashMap<String, ResearchTypeId>,
}

impl Catalog {
    /// Get a building definition by ID.
    pub fn building(&self, id: BuildingTypeId) -> Option<&BuildingSpec> {
        self.buildings.get(id.0 as usize)
    }

    /// Get a research definition by ID.
    pub fn research(&self, id: ResearchTypeId) -> Option<&ResearchSpec> {
        self.research.get(id.0 as usize)
    }

    /// Lookup a building ID by name.
    pub fn building_id(&self, name: &str) -> Option<BuildingTypeId> {
        self.building_names.get(name).copied()
    }

    /// Lookup a research ID by name.
    pub fn research_id(&self, name: &str) -> Option<ResearchTypeId> {
        self.research_names.get(name).copied()
    }

    /// Iterate all building definitions with their IDs.
    pub fn buildings(&self) -> impl Iterator<Item = (BuildingTypeId, &BuildingSpec)> {
        self.buildings
            .iter()
            .enumerate()
            .map(|(i, s)| (BuildingTypeId(i as u32), s))
    }

    /// Iterate all research definitions with their IDs.
    pub fn research_items(&self) -> impl Iterator<Item = (ResearchTypeId, &ResearchSpec)> {
        self.research
            .iter()
            .enumerate()
            .map(|(i, s)| (ResearchTypeId(i as u32), s))
    }

    /// The research that must be completed before `building` may be
    /// commissioned, if any research unlocks it.
    pub fn required_research_for_building(
        &self,
        building: BuildingTypeId,
    ) -> Option<ResearchTypeId> {
        self.research_items()
            .find(|(_, spec)| spec.unlock == Unlock::Building(building))
            .map(|(id, _)| id)
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn research_count(&self) -> usize {
        self.research.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
