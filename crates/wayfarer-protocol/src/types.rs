//! Envelope types and head codes.
//!
//! Gameplay responses carry a list of [`ClientMessage`]s. Each one is a
//! two-level envelope: the outer `head` says what kind of message the
//! `body` holds, and for agent events the body is itself a JSON object
//! with its own inner `head` naming the event kind.
//!
//! ```text
//! { "head": 1, "body": "{\"head\": 1, \"speaker\": \"X\", ...}" }
//!   └ outer: AGENT_EVENT      └ inner: SPEAK
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClientMessage: the outer envelope
// ---------------------------------------------------------------------------

/// The outer `{head, body}` wire wrapper around any server-pushed payload.
///
/// `body` is a JSON document encoded as a *string*, not a nested object.
/// That keeps the envelope shape fixed while the payload varies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    #[serde(default)]
    pub head: i32,
    #[serde(default)]
    pub body: String,
}

impl ClientMessage {
    /// Builds an agent-event envelope around an already-encoded body.
    pub fn agent_event(body: impl Into<String>) -> Self {
        Self {
            head: ClientMessageHead::AgentEvent.code(),
            body: body.into(),
        }
    }
}

/// Outer envelope discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMessageHead {
    None,
    AgentEvent,
}

impl ClientMessageHead {
    /// Maps a wire code to a head. Unknown codes return `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::AgentEvent),
            _ => None,
        }
    }

    /// The wire code for this head.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::AgentEvent => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// AgentEventHead: the inner discriminant
// ---------------------------------------------------------------------------

/// Inner discriminant of an agent event body.
///
/// The numeric codes are fixed by the server and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentEventHead {
    None,
    Speak,
    Whisper,
    Announce,
    MindVoice,
    CombatKickOff,
    CombatComplete,
}

impl AgentEventHead {
    /// Every head, in wire-code order.
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Speak,
        Self::Whisper,
        Self::Announce,
        Self::MindVoice,
        Self::CombatKickOff,
        Self::CombatComplete,
    ];

    /// Maps a wire code to a head. Unknown codes return `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Speak),
            2 => Some(Self::Whisper),
            3 => Some(Self::Announce),
            4 => Some(Self::MindVoice),
            5 => Some(Self::CombatKickOff),
            6 => Some(Self::CombatComplete),
            _ => None,
        }
    }

    /// The wire code for this head.
    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Speak => 1,
            Self::Whisper => 2,
            Self::Announce => 3,
            Self::MindVoice => 4,
            Self::CombatKickOff => 5,
            Self::CombatComplete => 6,
        }
    }
}

impl fmt::Display for AgentEventHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Speak => "SPEAK",
            Self::Whisper => "WHISPER",
            Self::Announce => "ANNOUNCE",
            Self::MindVoice => "MIND_VOICE",
            Self::CombatKickOff => "COMBAT_KICK_OFF",
            Self::CombatComplete => "COMBAT_COMPLETE",
        };
        f.write_str(name)
    }
}
