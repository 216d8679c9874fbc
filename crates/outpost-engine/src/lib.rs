//! Outpost Engine -- the tick orchestrator and construction state machine.
//!
//! This crate composes the foundational state types from `outpost-core` with
//! the energy subsystem (`outpost-energy`) and research progression
//! (`outpost-research`) into the [`colony::Colony`] engine that the transport
//! layer drives.
//!
//! # Tick Pipeline
//!
//! Each call to [`colony::Colony::run_tick`] advances the simulation by one
//! tick. Planets are processed independently, in ID order, each through four
//! strictly ordered steps:
//!
//! 1. **Energy** -- balance production against upkeep, shed unpowerable
//!    buildings, apply the net to the bounded store.
//! 2. **Credit** -- online buildings deposit material production into the
//!    shared-capacity warehouse; research contributions are collected per
//!    player.
//! 3. **Construction** -- commissioned buildings whose build time has elapsed
//!    become active.
//! 4. **Research** -- after all planets, each player's in-progress research
//!    advances exactly once.
//!
//! Re-running a tick at the same clock timestamp is rejected, so a manual
//! admin trigger cannot double-apply a scheduled slot.
//!
//! # Commands
//!
//! Player commands ([`command::Command`]) execute synchronously between
//! ticks and either fully apply or reject without touching any ledger. The
//! [`sync::SharedColony`] wrapper serializes commands against an in-flight
//! tick with a bounded wait.

pub mod colony;
pub mod command;
pub mod construction;
pub mod error;
pub mod schedule;
pub mod sync;

pub use colony::{Colony, DashboardSummary, ResearchOverview, TickReport};
pub use command::{Command, CommandLog, CommandOutcome};
pub use error::EngineError;
