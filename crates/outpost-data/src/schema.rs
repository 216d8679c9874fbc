//! Serde data file structs for catalog content.
//!
//! These structs define the on-disk format for building and research
//! definitions. They are deserialized from RON, JSON, or TOML and then
//! resolved into catalog types by the loader: resources, prerequisites, and
//! unlocked buildings are referenced by name, not by numeric ID.

use serde::Deserialize;

// ===========================================================================
// Buildings
// ===========================================================================

/// A building definition in a data file. Rates are per level per tick as
/// plain numbers; the loader converts them to fixed-point.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingData {
    pub name: String,
    pub category: CategoryData,
    /// Material output: `(resource_name, rate)` pairs.
    #[serde(default)]
    pub production: Vec<(String, f64)>,
    #[serde(default)]
    pub energy_production: f64,
    #[serde(default)]
    pub energy_upkeep: f64,
    #[serde(default)]
    pub research_rate: f64,
    /// One-time cost: `(resource_name, amount)` pairs.
    #[serde(default)]
    pub build_cost: Vec<(String, f64)>,
    #[serde(default)]
    pub energy_cost_to_build: f64,
    pub build_time_secs: u64,
    #[serde(default)]
    pub unique_per_planet: bool,
}

/// Building category in a data file.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryData {
    Command,
    Production,
    Energy,
    Research,
    Storage,
}

// ===========================================================================
// Research
// ===========================================================================

/// A research definition in a data file. The prerequisite references an
/// earlier research by name; building unlocks reference buildings by name.
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchData {
    pub name: String,
    pub category: ResearchCategoryData,
    #[serde(default = "default_tier")]
    pub tier: u8,
    #[serde(default)]
    pub prerequisite: Option<String>,
    #[serde(default)]
    pub required_labs: u32,
    pub cost: ResearchCostData,
    pub unlock: UnlockData,
}

fn default_tier() -> u8 {
    1
}

/// Research category in a data file.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchCategoryData {
    Military,
    Propulsion,
    Economy,
    Science,
}

/// Research cost model in a data file.
#[derive(Debug, Clone, Deserialize)]
pub enum ResearchCostData {
    /// Point-cost research: accumulate lab output.
    Points { total: f64 },
    /// Production-threshold research: accumulate realized production of one
    /// resource, gated on a minimum production rate at start.
    ProductionThreshold {
        resource: String,
        min_rate: f64,
        total: f64,
    },
}

/// Unlock granted by a research item in a data file.
#[derive(Debug, Clone, Deserialize)]
pub enum UnlockData {
    /// Unlocks a building, referenced by catalog name.
    Building(String),
    /// Unlocks a ship design, referenced by the shipyard's numeric ID.
    Ship(u32),
    /// A named percentage bonus.
    Bonus { name: String, percent: f64 },
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_from_ron() {
        let data: BuildingData = ron::from_str(
            r#"(
                name: "Durastahl Mine",
                category: production,
                production: [("durastahl", 40.0)],
                energy_upkeep: 10.0,
                build_cost: [("credits", 200.0)],
                energy_cost_to_build: 20.0,
                build_time_secs: 600,
            )"#,
        )
        .unwrap();
        assert_eq!(data.name, "Durastahl Mine");
        assert!(matches!(data.category, CategoryData::Production));
        assert_eq!(data.production, vec![("durastahl".to_string(), 40.0)]);
        // Defaults fill the omitted fields.
        assert_eq!(data.energy_production, 0.0);
        assert!(!data.unique_per_planet);
    }

    #[test]
    fn research_from_ron() {
        let data: ResearchData = ron::from_str(
            r#"(
                name: "Durastahl Alloys",
                category: economy,
                tier: 1,
                required_labs: 1,
                cost: ProductionThreshold(
                    resource: "durastahl",
                    min_rate: 20.0,
                    total: 5000.0,
                ),
                unlock: Bonus(name: "defense", percent: 15.0),
            )"#,
        )
        .unwrap();
        assert!(data.prerequisite.is_none());
        assert!(matches!(
            data.cost,
            ResearchCostData::ProductionThreshold { .. }
        ));
        assert!(matches!(data.unlock, UnlockData::Bonus { .. }));
    }

    #[test]
    fn research_from_json() {
        let data: ResearchData = serde_json::from_str(
            r#"{
                "name": "Energy Cells",
                "category": "science",
                "cost": { "Points": { "total": 100.0 } },
                "unlock": { "Building": "Fusion Plant" }
            }"#,
        )
        .unwrap();
        assert_eq!(data.tier, 1);
        assert_eq!(data.required_labs, 0);
        assert!(matches!(data.unlock, UnlockData::Building(ref n) if n == "Fusion Plant"));
    }

    #[test]
    fn building_from_toml() {
        let data: BuildingData = toml::from_str(
            r#"
                name = "Solar Array"
                category = "energy"
                energy_production = 40.0
                build_cost = [["credits", 150.0], ["durastahl", 80.0]]
                build_time_secs = 450
            "#,
        )
        .unwrap();
        assert!(matches!(data.category, CategoryData::Energy));
        assert_eq!(data.build_cost.len(), 2);
    }
}
