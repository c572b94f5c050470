//! Error types for the session layer.

use wayfarer_protocol::CombatPhase;

use crate::EndpointKind;

/// Why a session write or query was refused.
///
/// A rejected write never changes the session: the previous value stays
/// in place and the error is logged at the point of rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The caller had no value to write (the response omitted the field).
    #[error("refusing to clear {field}: no value supplied")]
    MissingValue { field: &'static str },

    /// An identity name was empty or whitespace.
    #[error("refusing to set {field} to a blank name")]
    BlankValue { field: &'static str },

    /// A mapping placed one actor on more than one stage.
    #[error("actor {actor} appears on multiple stages: {}", stages.join(", "))]
    ActorInMultipleStages { actor: String, stages: Vec<String> },

    /// A dungeon's `position` was neither -1 nor a valid level index.
    #[error("dungeon position {position} is out of range for {levels} levels")]
    InvalidDungeonPosition { position: i32, levels: usize },

    /// An update moved a known combat's phase backwards.
    #[error("combat {combat} cannot move back from {from} to {to}")]
    CombatRegressed {
        combat: String,
        from: CombatPhase,
        to: CombatPhase,
    },

    /// A combat carried a result before reaching COMPLETE.
    #[error("combat {combat} has a result during {phase}")]
    PrematureCombatResult { combat: String, phase: CombatPhase },

    /// The endpoint table has no URL for this endpoint.
    #[error("no url configured for {0}")]
    MissingEndpoint(EndpointKind),
}
