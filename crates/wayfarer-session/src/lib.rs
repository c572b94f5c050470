//! Session state for the Wayfarer client.
//!
//! A [`GameSession`] holds everything the client knows about the current
//! run: who is playing, where the server's endpoints live, which actors
//! stand on which stage, the dungeon and its combats, actor snapshots, and
//! the latest batch of decoded agent events.
//!
//! # How it fits in the stack
//!
//! ```text
//! Flows (wayfarer)  ← call the server, then write results here
//!     ↕
//! Session Layer (this crate)  ← single source of truth, guarded writes
//!     ↕
//! Protocol Layer (below)  ← models, wire envelopes, event decoder
//! ```
//!
//! Writes never half-apply: every `try_set_*` either stores the new value
//! or returns a [`SessionError`] and leaves the old one in place.

mod endpoint;
mod error;
mod session;

pub mod display;
pub mod mapping;

pub use endpoint::EndpointKind;
pub use error::SessionError;
pub use session::GameSession;
