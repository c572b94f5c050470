//! The game session: everything the client knows about the current run.
//!
//! One [`GameSession`] exists per run. Flows read it freely and write it
//! only through the `try_set_*` methods, which follow a single rule:
//! **refuse bad input and keep the old value.** A response that arrives
//! without a `mapping`, or with a dungeon whose position points nowhere,
//! is rejected and logged instead of wiping out good state.
//!
//! ```text
//! flow ──(response ok)──→ try_set_mapping(Some(m)) ──→ validate ──→ stored
//!                                                         │
//!                                                         └─✗─→ error!, old kept
//! ```

use wayfarer_protocol::{
    AgentEvent, AgentShortTermMemory, ApiEndpoints, ClientMessage, Combat, Dungeon,
    EntitySnapshot, Mapping, Stage,
};

use crate::{EndpointKind, SessionError, mapping};

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// The single source of truth for identity, world state, and the event log.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    user_name: String,
    game_name: String,
    actor_name: String,
    endpoints: ApiEndpoints,
    mapping: Mapping,
    dungeon: Dungeon,
    actor_snapshots: Vec<EntitySnapshot>,
    short_term_memories: Vec<AgentShortTermMemory>,

    /// Decoded events from the latest gameplay batch.
    agent_events: Vec<AgentEvent>,

    /// One display line per entry in `agent_events`, same order.
    agent_event_logs: Vec<String>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Getters ----------------------------------------------------------

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn actor_name(&self) -> &str {
        &self.actor_name
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn actor_snapshots(&self) -> &[EntitySnapshot] {
        &self.actor_snapshots
    }

    pub fn short_term_memories(&self) -> &[AgentShortTermMemory] {
        &self.short_term_memories
    }

    pub fn agent_events(&self) -> &[AgentEvent] {
        &self.agent_events
    }

    pub fn agent_event_logs(&self) -> &[String] {
        &self.agent_event_logs
    }

    /// Returns `true` once user and game names are both set.
    pub fn is_logged_in(&self) -> bool {
        !self.user_name.is_empty() && !self.game_name.is_empty()
    }

    // -- Guarded writes ---------------------------------------------------

    pub fn try_set_user_name(&mut self, value: Option<String>) -> Result<(), SessionError> {
        self.user_name = required_name("user_name", value)?;
        Ok(())
    }

    pub fn try_set_game_name(&mut self, value: Option<String>) -> Result<(), SessionError> {
        self.game_name = required_name("game_name", value)?;
        Ok(())
    }

    pub fn try_set_actor_name(&mut self, value: Option<String>) -> Result<(), SessionError> {
        self.actor_name = required_name("actor_name", value)?;
        Ok(())
    }

    pub fn try_set_endpoints(&mut self, value: Option<ApiEndpoints>) -> Result<(), SessionError> {
        self.endpoints = required("endpoints", value)?;
        tracing::debug!("endpoint table updated");
        Ok(())
    }

    /// Replaces the mapping.
    ///
    /// # Errors
    /// - [`SessionError::MissingValue`] for `None`
    /// - [`SessionError::ActorInMultipleStages`] if any actor is on two stages
    pub fn try_set_mapping(&mut self, value: Option<Mapping>) -> Result<(), SessionError> {
        let next = required("mapping", value)?;
        mapping::validate_mapping(&next).map_err(rejected)?;
        tracing::debug!(stages = next.len(), "mapping updated");
        self.mapping = next;
        Ok(())
    }

    /// Replaces the dungeon.
    ///
    /// # Errors
    /// - [`SessionError::MissingValue`] for `None`
    /// - [`SessionError::InvalidDungeonPosition`] if `position` points nowhere
    /// - [`SessionError::PrematureCombatResult`] if a combat has a result before COMPLETE
    /// - [`SessionError::CombatRegressed`] if a combat of the same dungeon
    ///   moves to an earlier phase
    pub fn try_set_dungeon(&mut self, value: Option<Dungeon>) -> Result<(), SessionError> {
        let next = required("dungeon", value)?;
        check_dungeon(&self.dungeon, &next).map_err(rejected)?;
        tracing::debug!(
            dungeon = %next.name,
            position = next.position,
            combats = next.engagement.combats.len(),
            "dungeon updated"
        );
        self.dungeon = next;
        Ok(())
    }

    pub fn try_set_actor_snapshots(
        &mut self,
        value: Option<Vec<EntitySnapshot>>,
    ) -> Result<(), SessionError> {
        self.actor_snapshots = required("actor_snapshots", value)?;
        Ok(())
    }

    pub fn try_set_short_term_memories(
        &mut self,
        value: Option<Vec<AgentShortTermMemory>>,
    ) -> Result<(), SessionError> {
        self.short_term_memories = required("short_term_memories", value)?;
        Ok(())
    }

    /// Forgets who is playing. Used after a successful logout; this is the
    /// only way to return the identity names to blank.
    pub fn clear_identity(&mut self) {
        self.user_name.clear();
        self.game_name.clear();
        self.actor_name.clear();
    }

    // -- Endpoints ----------------------------------------------------------

    /// Resolves an endpoint against the current table and identity.
    ///
    /// Per-player endpoints are built fresh on every call, so a later
    /// change of user or game name is reflected immediately.
    ///
    /// # Errors
    /// [`SessionError::MissingEndpoint`] if the table has no entry for `kind`.
    pub fn url(&self, kind: EndpointKind) -> Result<String, SessionError> {
        let base = kind.base(&self.endpoints);
        if base.is_empty() {
            return Err(SessionError::MissingEndpoint(kind));
        }
        if kind.is_per_player() {
            Ok(format!("{base}{}/{}", self.user_name, self.game_name))
        } else {
            Ok(base.to_string())
        }
    }

    // -- Event batches ------------------------------------------------------

    /// Replaces the event batch with the decoded contents of `messages`.
    ///
    /// Both lists are cleared first, even for an empty batch. Each message
    /// yields exactly one event and one log line, in input order. A message
    /// that fails to decode becomes a NONE event carrying its raw body and
    /// does not affect its neighbours.
    pub fn process_client_messages(&mut self, messages: &[ClientMessage]) {
        self.agent_events.clear();
        self.agent_event_logs.clear();

        for message in messages {
            let event = wayfarer_protocol::decode(message);
            tracing::trace!(head = %event.head(), "agent event");
            self.agent_event_logs.push(event.log_line());
            self.agent_events.push(event);
        }

        tracing::debug!(count = self.agent_events.len(), "client messages processed");
    }

    // -- Queries ------------------------------------------------------------

    /// The stage `actor` is on, if any.
    pub fn actor_location(&self, actor: &str) -> Result<Option<&str>, SessionError> {
        mapping::actor_location(actor, &self.mapping)
    }

    /// Everyone sharing a stage with `actor`, `actor` included.
    pub fn retrieve_actors_for_stage(&self, actor: &str) -> Result<Vec<String>, SessionError> {
        mapping::retrieve_actors_for_stage(actor, &self.mapping)
    }

    pub fn current_level(&self) -> Option<&Stage> {
        self.dungeon.current_level()
    }

    pub fn latest_combat(&self) -> Option<&Combat> {
        self.dungeon.latest_combat()
    }

    pub fn snapshot(&self, actor: &str) -> Option<&EntitySnapshot> {
        self.actor_snapshots.iter().find(|s| s.name == actor)
    }

    pub fn short_term_memory(&self, actor: &str) -> Option<&AgentShortTermMemory> {
        self.short_term_memories.iter().find(|m| m.name == actor)
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn rejected(error: SessionError) -> SessionError {
    tracing::error!(%error, "session write rejected");
    error
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, SessionError> {
    value.ok_or_else(|| rejected(SessionError::MissingValue { field }))
}

fn required_name(field: &'static str, value: Option<String>) -> Result<String, SessionError> {
    let value = required(field, value)?;
    if value.trim().is_empty() {
        return Err(rejected(SessionError::BlankValue { field }));
    }
    Ok(value)
}

fn check_dungeon(current: &Dungeon, next: &Dungeon) -> Result<(), SessionError> {
    if !next.has_valid_position() {
        return Err(SessionError::InvalidDungeonPosition {
            position: next.position,
            levels: next.levels.len(),
        });
    }

    if let Some(combat) = next.engagement.combats.iter().find(|c| !c.is_consistent()) {
        return Err(SessionError::PrematureCombatResult {
            combat: combat.name.clone(),
            phase: combat.phase,
        });
    }

    // A different dungeon starts a new history.
    if current.name != next.name {
        return Ok(());
    }

    for (before, after) in current.engagement.combats.iter().zip(&next.engagement.combats) {
        if before.name == after.name && after.phase < before.phase {
            return Err(SessionError::CombatRegressed {
                combat: after.name.clone(),
                from: before.phase,
                to: after.phase,
            });
        }
    }

    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
