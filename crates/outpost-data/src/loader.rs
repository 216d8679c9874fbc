//! Resolution pipeline: reads data files, resolves name references, builds
//! the frozen catalog.
//!
//! Supports RON, TOML, and JSON, detected by extension. Buildings resolve
//! before research so that research can reference unlocked buildings by
//! name; a research prerequisite must appear earlier in the research file.

use crate::schema::{
    BuildingData, CategoryData, ResearchCategoryData, ResearchCostData, ResearchData, UnlockData,
};
use outpost_core::catalog::{
    BuildingCategory, BuildingSpec, Catalog, CatalogBuilder, CatalogError, ResearchCategory,
    ResearchCost, ResearchSpec, Unlock,
};
use outpost_core::fixed::f64_to_fixed64;
use outpost_core::id::ShipTypeId;
use outpost_core::resource::{ResourceKind, ResourceSet};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading catalog data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A resource name in a data file is not a known resource kind.
    #[error("unknown resource '{name}' in {context}")]
    UnknownResource { context: String, name: String },

    /// A name reference could not be resolved.
    #[error("unresolved {kind} reference '{name}' in {context}")]
    UnresolvedRef {
        kind: &'static str,
        name: String,
        context: String,
    },

    /// The resolved definitions failed catalog validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection and deserialization
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Scan a directory for a data file with the given base name (without
/// extension). Returns `Ok(None)` if no file is found, or
/// `Err(ConflictingFormats)` if multiple formats exist for the same base.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }
    Ok(found)
}

/// Deserialize a list of entries from a file. For TOML, the list lives under
/// `toml_key` in a top-level table; RON and JSON deserialize directly as an
/// array.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => {
            let table: toml::Value =
                toml::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_err(format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_err(e.to_string()))
        }
    }
}

// ===========================================================================
// Name resolution
// ===========================================================================

fn resolve_resource(name: &str, context: &str) -> Result<ResourceKind, DataLoadError> {
    ResourceKind::ALL
        .into_iter()
        .find(|kind| kind.name() == name)
        .ok_or_else(|| DataLoadError::UnknownResource {
            context: context.to_string(),
            name: name.to_string(),
        })
}

fn resolve_resource_set(
    entries: &[(String, f64)],
    context: &str,
) -> Result<ResourceSet, DataLoadError> {
    let mut set = ResourceSet::new();
    for (name, amount) in entries {
        let kind = resolve_resource(name, context)?;
        set.add(kind, f64_to_fixed64(*amount));
    }
    Ok(set)
}

fn building_category(data: CategoryData) -> BuildingCategory {
    match data {
        CategoryData::Command => BuildingCategory::Command,
        CategoryData::Production => BuildingCategory::Production,
        CategoryData::Energy => BuildingCategory::Energy,
        CategoryData::Research => BuildingCategory::Research,
        CategoryData::Storage => BuildingCategory::Storage,
    }
}

fn research_category(data: ResearchCategoryData) -> ResearchCategory {
    match data {
        ResearchCategoryData::Military => ResearchCategory::Military,
        ResearchCategoryData::Propulsion => ResearchCategory::Propulsion,
        ResearchCategoryData::Economy => ResearchCategory::Economy,
        ResearchCategoryData::Science => ResearchCategory::Science,
    }
}

/// Resolve parsed data entries into a frozen catalog.
pub fn resolve_catalog(
    buildings: Vec<BuildingData>,
    research: Vec<ResearchData>,
) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    for data in buildings {
        let context = format!("building '{}'", data.name);
        let spec = BuildingSpec {
            name: data.name,
            category: building_category(data.category),
            production: resolve_resource_set(&data.production, &context)?,
            energy_production: f64_to_fixed64(data.energy_production),
            energy_upkeep: f64_to_fixed64(data.energy_upkeep),
            research_rate: f64_to_fixed64(data.research_rate),
            build_cost: resolve_resource_set(&data.build_cost, &context)?,
            energy_cost_to_build: f64_to_fixed64(data.energy_cost_to_build),
            build_time_secs: data.build_time_secs,
            unique_per_planet: data.unique_per_planet,
        };
        builder.register_building(spec)?;
    }

    for data in research {
        let context = format!("research '{}'", data.name);
        let prerequisite = data
            .prerequisite
            .map(|name| {
                builder
                    .research_id(&name)
                    .ok_or_else(|| DataLoadError::UnresolvedRef {
                        kind: "research",
                        name,
                        context: context.clone(),
                    })
            })
            .transpose()?;
        let cost = match data.cost {
            ResearchCostData::Points { total } => ResearchCost::Points {
                total: f64_to_fixed64(total),
            },
            ResearchCostData::ProductionThreshold {
                resource,
                min_rate,
                total,
            } => ResearchCost::ProductionThreshold {
                resource: resolve_resource(&resource, &context)?,
                min_rate: f64_to_fixed64(min_rate),
                total: f64_to_fixed64(total),
            },
        };
        let unlock = match data.unlock {
            UnlockData::Building(name) => {
                let id =
                    builder
                        .building_id(&name)
                        .ok_or_else(|| DataLoadError::UnresolvedRef {
                            kind: "building",
                            name,
                            context: context.clone(),
                        })?;
                Unlock::Building(id)
            }
            UnlockData::Ship(id) => Unlock::Ship(ShipTypeId(id)),
            UnlockData::Bonus { name, percent } => Unlock::Bonus {
                name,
                percent: f64_to_fixed64(percent),
            },
        };
        builder.register_research(ResearchSpec {
            name: data.name,
            category: research_category(data.category),
            tier: data.tier,
            prerequisite,
            required_labs: data.required_labs,
            cost,
            unlock,
        })?;
    }

    Ok(builder.build()?)
}

/// Load a catalog from a directory containing `buildings.{ron,toml,json}`
/// and `research.{ron,toml,json}`.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let buildings_path =
        find_data_file(dir, "buildings")?.ok_or(DataLoadError::MissingRequired {
            file: "buildings",
            dir: dir.to_path_buf(),
        })?;
    let research_path = find_data_file(dir, "research")?.ok_or(DataLoadError::MissingRequired {
        file: "research",
        dir: dir.to_path_buf(),
    })?;

    let buildings: Vec<BuildingData> = deserialize_list(&buildings_path, "buildings")?;
    let research: Vec<ResearchData> = deserialize_list(&research_path, "research")?;
    resolve_catalog(buildings, research)
}

// ===========================================================================
// Tests
// ===========================================================================
