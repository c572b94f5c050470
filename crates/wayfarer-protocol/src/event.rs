//! Typed agent events and the envelope decoder.
//!
//! The server pushes a heterogeneous stream of events (dialogue,
//! announcements, combat milestones). Each one arrives as a
//! [`ClientMessage`] and is decoded here into exactly one [`AgentEvent`]
//! variant.
//!
//! # Failing closed
//!
//! [`decode`] never fails. Anything it can't make sense of (unknown heads,
//! malformed JSON, a payload that doesn't match its declared head) becomes
//! [`AgentEvent::None`] carrying the raw body, and a warning is logged.
//! One bad event must not take the rest of a batch down with it.
//! [`try_decode`] exposes the underlying error for callers that care.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AgentEventHead, ClientMessage, ClientMessageHead, ProtocolError};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------
//
// Every payload field is required except `message`, which every event body
// may carry. A SPEAK body without a `speaker` is not a SPEAK event.

/// Someone speaks to someone else, out loud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakEvent {
    pub speaker: String,
    pub listener: String,
    pub dialogue: String,
    #[serde(default)]
    pub message: String,
}

/// Someone speaks to someone else, privately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhisperEvent {
    pub speaker: String,
    pub listener: String,
    pub dialogue: String,
    #[serde(default)]
    pub message: String,
}

/// A broadcast to everyone on a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceEvent {
    pub announcement_speaker: String,
    pub event_stage: String,
    pub announcement_message: String,
    #[serde(default)]
    pub message: String,
}

/// An actor's inner monologue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindVoiceEvent {
    pub speaker: String,
    pub dialogue: String,
    #[serde(default)]
    pub message: String,
}

/// A combat has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatKickOffEvent {
    pub actor: String,
    pub description: String,
    #[serde(default)]
    pub message: String,
}

/// A combat has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatCompleteEvent {
    pub actor: String,
    pub summary: String,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// AgentEvent
// ---------------------------------------------------------------------------

/// A decoded agent event. One variant per [`AgentEventHead`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// An event with no typed payload, or the placeholder substituted for
    /// an envelope that could not be decoded. `message` holds the event's
    /// message or the raw body respectively.
    None { message: String },
    Speak(SpeakEvent),
    Whisper(WhisperEvent),
    Announce(AnnounceEvent),
    MindVoice(MindVoiceEvent),
    CombatKickOff(CombatKickOffEvent),
    CombatComplete(CombatCompleteEvent),
}

impl AgentEvent {
    /// The discriminant of this event.
    pub fn head(&self) -> AgentEventHead {
        match self {
            Self::None { .. } => AgentEventHead::None,
            Self::Speak(_) => AgentEventHead::Speak,
            Self::Whisper(_) => AgentEventHead::Whisper,
            Self::Announce(_) => AgentEventHead::Announce,
            Self::MindVoice(_) => AgentEventHead::MindVoice,
            Self::CombatKickOff(_) => AgentEventHead::CombatKickOff,
            Self::CombatComplete(_) => AgentEventHead::CombatComplete,
        }
    }

    /// The free-form `message` every event may carry.
    pub fn message(&self) -> &str {
        match self {
            Self::None { message } => message,
            Self::Speak(e) => &e.message,
            Self::Whisper(e) => &e.message,
            Self::Announce(e) => &e.message,
            Self::MindVoice(e) => &e.message,
            Self::CombatKickOff(e) => &e.message,
            Self::CombatComplete(e) => &e.message,
        }
    }

    /// Renders the one-line, human-readable form shown in the event log.
    ///
    /// These templates are a display contract; other clients compare
    /// against them verbatim.
    ///
    /// ```rust
    /// use wayfarer_protocol::{AgentEvent, SpeakEvent};
    ///
    /// let event = AgentEvent::Speak(SpeakEvent {
    ///     speaker: "X".into(),
    ///     listener: "Y".into(),
    ///     dialogue: "hi".into(),
    ///     message: String::new(),
    /// });
    /// assert_eq!(event.log_line(), "X : @Y hi");
    /// ```
    pub fn log_line(&self) -> String {
        match self {
            Self::None { message } => message.clone(),
            Self::Speak(e) => {
                format!("{} : @{} {}", e.speaker, e.listener, e.dialogue)
            }
            Self::Whisper(e) => {
                format!("{} : ......{} {}", e.speaker, e.listener, e.dialogue)
            }
            Self::Announce(e) => format!(
                "{}({}) : !!{}",
                e.announcement_speaker, e.event_stage, e.announcement_message
            ),
            Self::MindVoice(e) => format!("{} % {}", e.speaker, e.dialogue),
            Self::CombatKickOff(e) => format!("{} => {}", e.actor, e.description),
            Self::CombatComplete(e) => format!("{} => {}", e.actor, e.summary),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes an envelope into an event, or explains why it couldn't.
///
/// 1. The outer head must be `AGENT_EVENT`.
/// 2. The body is parsed generically, only far enough to read the inner head.
/// 3. The inner head selects the variant, and the same parsed value is
///    deserialized into that variant's payload.
///
/// # Errors
/// - [`ProtocolError::UnknownMessageHead`]: outer head is not `AGENT_EVENT`
/// - [`ProtocolError::Decode`]: body is not JSON, or the payload doesn't
///   match the shape its head declares
/// - [`ProtocolError::InvalidMessage`]: body has no integer `head`
/// - [`ProtocolError::UnknownEventHead`]: inner head is out of range
pub fn try_decode(envelope: &ClientMessage) -> Result<AgentEvent, ProtocolError> {
    match ClientMessageHead::from_code(envelope.head) {
        Some(ClientMessageHead::AgentEvent) => decode_agent_event(&envelope.body),
        _ => Err(ProtocolError::UnknownMessageHead(envelope.head)),
    }
}

/// Decodes an envelope into an event, substituting a placeholder on failure.
///
/// The placeholder is [`AgentEvent::None`] whose message is the raw body,
/// so nothing the server sent is silently lost from the log.
pub fn decode(envelope: &ClientMessage) -> AgentEvent {
    match try_decode(envelope) {
        Ok(event) => event,
        Err(error) => {
            tracing::warn!(
                head = envelope.head,
                %error,
                "undecodable client message, substituting placeholder"
            );
            AgentEvent::None {
                message: envelope.body.clone(),
            }
        }
    }
}

fn decode_agent_event(body: &str) -> Result<AgentEvent, ProtocolError> {
    let value: Value = serde_json::from_str(body).map_err(ProtocolError::Decode)?;

    let code = value
        .get("head")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            ProtocolError::InvalidMessage("agent event body has no integer head".into())
        })?;
    let head = AgentEventHead::from_code(code).ok_or(ProtocolError::UnknownEventHead(code))?;

    let event = match head {
        AgentEventHead::None => AgentEvent::None {
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        },
        AgentEventHead::Speak => AgentEvent::Speak(payload(value)?),
        AgentEventHead::Whisper => AgentEvent::Whisper(payload(value)?),
        AgentEventHead::Announce => AgentEvent::Announce(payload(value)?),
        AgentEventHead::MindVoice => AgentEvent::MindVoice(payload(value)?),
        AgentEventHead::CombatKickOff => AgentEvent::CombatKickOff(payload(value)?),
        AgentEventHead::CombatComplete => AgentEvent::CombatComplete(payload(value)?),
    };

    tracing::trace!(head = %event.head(), "decoded agent event");
    Ok(event)
}

fn payload<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(ProtocolError::Decode)
}
