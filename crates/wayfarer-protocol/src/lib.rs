//! Wire protocol for Wayfarer.
//!
//! This crate defines the "language" the game client and the game server
//! speak over HTTP/JSON:
//!
//! - **Envelopes** ([`ClientMessage`], [`ClientMessageHead`]): the outer
//!   `{head, body}` wrapper the server pushes in gameplay responses.
//! - **Events** ([`AgentEvent`], [`decode`]): the typed agent events folded
//!   out of those envelopes, one variant per event kind.
//! - **Models** ([`Dungeon`], [`Combat`], [`EntitySnapshot`], ...): the world
//!   data the server returns from its view endpoints.
//! - **API** ([`ApiEndpoints`], request/response pairs): one request and one
//!   response type per endpoint.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those types become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (typed responses, events) → Session (state)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod api;
mod codec;
mod error;
mod event;
mod image;
mod model;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use api::{
    ApiEndpoints, ApiEndpointsResponse, ApiResponse, BasicResponse,
    GameplayRequest, GameplayResponse, LoginRequest, LogoutRequest,
    StageTransitionRequest, StartRequest, UserInput, ViewActorResponse,
    ViewDungeonResponse, ViewHomeResponse,
};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use event::{
    AgentEvent, AnnounceEvent, CombatCompleteEvent, CombatKickOffEvent,
    MindVoiceEvent, SpeakEvent, WhisperEvent, decode, try_decode,
};
pub use image::{
    GenerateImagesRequest, GenerateImagesResponse, ImageInfo,
    ImageListResponse,
};
pub use model::{
    Actor, ActorPrototype, AgentShortTermMemory, BaseMessage, Combat,
    CombatPhase, CombatResult, ComponentSnapshot, Dungeon, Engagement,
    EntitySnapshot, HandComponent, HandDetail, Mapping, Round,
    RpgCharacterProfile, RpgCharacterProfileComponent, Skill, Stage,
    StagePrototype, StatusEffect,
};
pub use types::{AgentEventHead, ClientMessage, ClientMessageHead};
