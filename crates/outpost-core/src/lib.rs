//! Outpost Core -- foundational types for the colony economy simulation.
//!
//! This crate provides the per-planet resource ledger, the immutable catalog
//! of building and research definitions, planet and building state, the
//! simulation event queue, and deterministic fixed-point arithmetic that the
//! rest of the engine depends on.
//!
//! # Tick Model
//!
//! The simulation advances in discrete ticks fired by an external scheduler.
//! Within a tick, each planet is processed independently through four strictly
//! ordered steps (energy balance, production credit, construction completion,
//! research advance). This crate holds the state those steps mutate; the
//! orchestration itself lives in `outpost-engine`.
//!
//! # Key Types
//!
//! - [`ledger::ResourceLedger`] -- capacity-bounded material balances plus a
//!   separately bounded energy store.
//! - [`catalog::Catalog`] -- immutable registry of building and research
//!   definitions (frozen at startup).
//! - [`planet::Planet`] -- one colonized planet: ledger, grid fields, and
//!   building instances.
//! - [`building::BuildingState`] -- tagged construction lifecycle state.
//! - [`event::EventQueue`] -- per-tick event queue drained by the transport
//!   collaborator.
//! - [`clock::Clock`] -- injectable current-time source for deterministic
//!   timing tests.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod building;
pub mod catalog;
pub mod clock;
pub mod event;
pub mod fixed;
pub mod id;
pub mod ledger;
pub mod planet;
pub mod resource;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
