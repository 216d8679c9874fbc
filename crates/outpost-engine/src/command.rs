//! Player and admin commands.
//!
//! The transport layer feeds every externally triggered mutation through
//! [`Colony::execute`], which dispatches to the engine and records an audit
//! entry for each command that succeeded. Commands run synchronously: the
//! caller gets the rejection or the outcome immediately, and a rejected
//! command has touched nothing.

use crate::colony::{Colony, TickReport};
use crate::error::EngineError;
use outpost_core::fixed::Ticks;
use outpost_core::id::{BuildingId, BuildingTypeId, FieldId, PlanetId, PlayerId, ResearchTypeId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single externally triggered operation on the engine. Serializable so
/// the transport layer can pass commands through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Commission a building on a vacant field.
    StartConstruction {
        planet: PlanetId,
        building_type: BuildingTypeId,
        field: FieldId,
    },
    /// Tear down a building with a 50% material refund.
    Demolish {
        planet: PlanetId,
        building: BuildingId,
    },
    /// Begin researching an item.
    StartResearch {
        player: PlayerId,
        research: ResearchTypeId,
    },
    /// Cancel in-progress research, discarding accumulated progress.
    CancelResearch { player: PlayerId },
    /// Administrative: run one tick at the current clock time.
    RunTick,
}

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Commissioned(BuildingId),
    Demolished,
    ResearchStarted,
    ResearchCancelled(ResearchTypeId),
    TickCompleted(TickReport),
}

// ---------------------------------------------------------------------------
// CommandLog
// ---------------------------------------------------------------------------

/// Bounded audit history of executed commands: `(tick, command)` pairs in
/// execution order. Oldest entries are trimmed past the limit.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<(Ticks, Command)>,
    max_entries: usize,
}

impl CommandLog {
    /// A log retaining up to `max_entries` entries. Zero disables recording.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    /// Record one executed command.
    pub fn record(&mut self, tick: Ticks, command: Command) {
        if self.max_entries == 0 {
            return;
        }
        self.entries.push((tick, command));
        let excess = self.entries.len().saturating_sub(self.max_entries);
        if excess > 0 {
            self.entries.drain(..excess);
        }
    }

    /// The recorded `(tick, command)` entries, oldest first.
    pub fn entries(&self) -> &[(Ticks, Command)] {
        &self.entries
    }

    /// Forget all recorded entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

impl Colony {
    /// Execute one command, recording it in the audit log on success.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, EngineError> {
        let outcome = match &command {
            Command::StartConstruction {
                planet,
                building_type,
                field,
            } => self
                .start_construction(*planet, *building_type, *field)
                .map(CommandOutcome::Commissioned)?,
            Command::Demolish { planet, building } => {
                self.demolish(*planet, *building)?;
                CommandOutcome::Demolished
            }
            Command::StartResearch { player, research } => {
                self.start_research(*player, *research)?;
                CommandOutcome::ResearchStarted
            }
            Command::CancelResearch { player } => {
                let cancelled = self.cancel_research(*player)?;
                CommandOutcome::ResearchCancelled(cancelled)
            }
            Command::RunTick => CommandOutcome::TickCompleted(self.run_tick()?),
        };
        self.log_command(command);
        Ok(outcome)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
