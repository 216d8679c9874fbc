//! Outpost Data -- catalog definitions from data files.
//!
//! Building and research definitions live in RON, TOML, or JSON files and
//! are resolved by name into the frozen [`outpost_core::catalog::Catalog`]
//! the engine runs against. This crate also ships the base game catalog
//! under `data/`, loadable without touching the filesystem via
//! [`default_catalog`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, load_catalog, resolve_catalog};

use outpost_core::catalog::Catalog;

/// The base game catalog compiled into the crate.
pub fn default_catalog() -> Result<Catalog, DataLoadError> {
    let buildings: Vec<schema::BuildingData> =
        ron::from_str(include_str!("../data/buildings.ron")).map_err(|e| {
            DataLoadError::Parse {
                file: "data/buildings.ron".into(),
                detail: e.to_string(),
            }
        })?;
    let research: Vec<schema::ResearchData> =
        ron::from_str(include_str!("../data/research.ron")).map_err(|e| {
            DataLoadError::Parse {
                file: "data/research.ron".into(),
                detail: e.to_string(),
            }
        })?;
    resolve_catalog(buildings, research)
}
