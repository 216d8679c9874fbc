//! Engine command and tick errors.

use outpost_core::clock::Timestamp;
use outpost_core::id::{BuildingId, BuildingTypeId, FieldId, PlanetId, PlayerId, ResearchTypeId};
use outpost_core::ledger::LedgerError;
use outpost_research::ResearchError;

/// Errors returned by engine commands and queries.
///
/// Every variant is a recoverable, synchronous rejection: the transport
/// layer translates them into user-facing messages, and a failed command
/// leaves all ledgers unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("planet not found: {0:?}")]
    PlanetNotFound(PlanetId),

    #[error("player {0:?} owns no planets")]
    PlayerNotFound(PlayerId),

    #[error("building type not found: {0:?}")]
    UnknownBuildingType(BuildingTypeId),

    #[error("building not found: {0:?}")]
    BuildingNotFound(BuildingId),

    #[error("field {0:?} is outside the planet's grid")]
    FieldOutOfRange(FieldId),

    #[error("field {0:?} is already occupied")]
    FieldOccupied(FieldId),

    #[error("only one building of type {0:?} may exist per planet")]
    SingleInstanceViolation(BuildingTypeId),

    #[error("building type {building:?} requires research {research:?}")]
    BuildingNotUnlocked {
        building: BuildingTypeId,
        research: ResearchTypeId,
    },

    #[error("a tick already ran at {at:?}")]
    TickAlreadyRan { at: Timestamp },

    #[error("engine busy: a tick is being processed, retry the command")]
    Busy,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Research(#[from] ResearchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::fixed::Fixed64;
    use outpost_core::resource::ResourceKind;

    #[test]
    fn ledger_errors_convert() {
        let err: EngineError = LedgerError::InsufficientEnergy {
            requested: Fixed64::from_num(50),
            available: Fixed64::from_num(10),
        }
        .into();
        assert!(matches!(
            err,
            EngineError::Ledger(LedgerError::InsufficientEnergy { .. })
        ));
    }

    #[test]
    fn research_errors_convert() {
        let err: EngineError = ResearchError::NothingInProgress.into();
        assert!(matches!(
            err,
            EngineError::Research(ResearchError::NothingInProgress)
        ));
    }

    #[test]
    fn display_messages_name_the_subject() {
        let msg = format!("{}", EngineError::FieldOccupied(FieldId(4)));
        assert!(msg.contains("occupied"), "got: {msg}");

        let msg = format!(
            "{}",
            EngineError::Ledger(LedgerError::InsufficientResources {
                kind: ResourceKind::Crystal,
                requested: Fixed64::from_num(10),
                available: Fixed64::from_num(3),
            })
        );
        assert!(msg.contains("Crystal"), "got: {msg}");
    }
}
