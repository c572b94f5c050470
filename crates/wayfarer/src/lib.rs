//! # Wayfarer
//!
//! Session-consistent game client for Wayfarer servers.
//!
//! Wayfarer keeps one player's view of the world (identity, stage mapping,
//! dungeon and combat progress, actor snapshots, and the latest batch of
//! agent events) consistent across retryable HTTP calls. A flow either
//! completes and updates the [`GameSession`], or fails and leaves it
//! untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wayfarer::prelude::*;
//!
//! # async fn run() -> Result<(), WayfarerError> {
//! wayfarer::init_tracing();
//!
//! let mut client = GameClient::from_env();
//! let cancel = client.child_token();
//!
//! client.boot(&cancel).await?;
//! client.login("alice", "demo", &cancel).await?;
//! client.start("Hero", &cancel).await?;
//! client.view_home(&cancel).await?;
//! client
//!     .home_gameplay(UserInput::new("/speak").with("target", "Ally"), &cancel)
//!     .await?;
//!
//! for line in client.session().agent_event_logs() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Crate | Role |
//! |-------|------|
//! | `wayfarer-protocol` | wire types, models, event decoding |
//! | `wayfarer-transport` | HTTP with timeout, retry and cancellation |
//! | `wayfarer-session` | guarded session state and display text |
//! | `wayfarer-cache` | URL-keyed texture cache |

mod client;
mod config;
mod error;
mod logging;

pub use client::{GameClient, GameClientBuilder, Texture};
pub use config::{ClientConfig, DEFAULT_IMAGE_SERVER_URL, DEFAULT_SERVER_URL};
pub use error::WayfarerError;
pub use logging::{DEFAULT_FILTER, init_tracing};

pub use wayfarer_cache as cache;
pub use wayfarer_protocol as protocol;
pub use wayfarer_session as session;
pub use wayfarer_transport as transport;

/// Everything a typical caller needs.
pub mod prelude {
    pub use crate::{ClientConfig, GameClient, GameClientBuilder, Texture, WayfarerError};
    pub use wayfarer_cache::{CacheConfig, ResourceCache, SlotId};
    pub use wayfarer_protocol::{AgentEvent, AgentEventHead, ImageInfo, UserInput};
    pub use wayfarer_session::{EndpointKind, GameSession, SessionError, display};
    #[cfg(feature = "reqwest")]
    pub use wayfarer_transport::ReqwestTransport;
    pub use wayfarer_transport::{CancellationToken, HttpTransport, RequestConfig, TransportError};
}
