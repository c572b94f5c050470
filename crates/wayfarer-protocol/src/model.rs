//! World data returned by the server's view endpoints.
//!
//! These types are display-side mirrors of server state. The client never
//! runs game rules over them; it only checks the few structural invariants
//! that would make the data nonsensical to show (a dungeon position past
//! the last level, a combat phase moving backwards).
//!
//! Every struct is `#[serde(default)]`: the server omits empty fields, and
//! a missing list is the same as an empty one for display purposes.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// Stage name → ordered actor names on that stage.
///
/// A `BTreeMap` keeps iteration order deterministic, which matters for
/// anything that scans the mapping and reports the first match.
pub type Mapping = BTreeMap<String, Vec<String>>;

// ---------------------------------------------------------------------------
// Character sheets
// ---------------------------------------------------------------------------

/// Static description of an actor type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorPrototype {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub profile: String,
    pub appearance: String,
}

/// Static description of a stage type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagePrototype {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub profile: String,
}

/// Base and growth numbers for an actor. Derived stats are computed, not
/// stored, so they always agree with the base numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpgCharacterProfile {
    pub experience: i32,
    pub fixed_level: i32,
    pub hp: i32,

    pub base_max_hp: i32,
    pub base_strength: i32,
    pub base_dexterity: i32,
    pub base_wisdom: i32,

    pub base_physical_attack: i32,
    pub base_physical_defense: i32,
    pub base_magic_attack: i32,
    pub base_magic_defense: i32,

    pub strength_per_level: i32,
    pub dexterity_per_level: i32,
    pub wisdom_per_level: i32,
}

impl Default for RpgCharacterProfile {
    fn default() -> Self {
        Self {
            experience: 0,
            fixed_level: 1,
            hp: 0,
            base_max_hp: 50,
            base_strength: 5,
            base_dexterity: 6,
            base_wisdom: 5,
            base_physical_attack: 8,
            base_physical_defense: 5,
            base_magic_attack: 7,
            base_magic_defense: 6,
            strength_per_level: 2,
            dexterity_per_level: 1,
            wisdom_per_level: 1,
        }
    }
}

/// Derived stats saturate at the `i32` bounds instead of overflowing.
impl RpgCharacterProfile {
    /// Levels gained from experience (one per 1000 points).
    pub fn progression_level(&self) -> i32 {
        self.experience / 1000
    }

    pub fn level(&self) -> i32 {
        self.fixed_level.saturating_add(self.progression_level())
    }

    pub fn strength(&self) -> i32 {
        scaled(self.base_strength, self.strength_per_level, self.progression_level())
    }

    pub fn dexterity(&self) -> i32 {
        scaled(self.base_dexterity, self.dexterity_per_level, self.progression_level())
    }

    pub fn wisdom(&self) -> i32 {
        scaled(self.base_wisdom, self.wisdom_per_level, self.progression_level())
    }

    pub fn max_hp(&self) -> i32 {
        scaled(self.base_max_hp, self.strength(), 10)
    }

    pub fn physical_attack(&self) -> i32 {
        scaled(self.base_physical_attack, self.strength(), 2)
    }

    pub fn physical_defense(&self) -> i32 {
        self.base_physical_defense.saturating_add(self.strength())
    }

    pub fn magic_attack(&self) -> i32 {
        scaled(self.base_magic_attack, self.wisdom(), 2)
    }

    pub fn magic_defense(&self) -> i32 {
        self.base_magic_defense.saturating_add(self.wisdom())
    }
}

/// `base + rate * factor`, clamped to `i32`.
fn scaled(base: i32, rate: i32, factor: i32) -> i32 {
    base.saturating_add(rate.saturating_mul(factor))
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    pub name: String,
    pub prototype: ActorPrototype,
    pub system_message: String,
    pub kick_off_message: String,
    pub rpg_character_profile: RpgCharacterProfile,
}

/// A named location owning zero or more actors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage {
    pub name: String,
    pub prototype: StagePrototype,
    pub system_message: String,
    pub kick_off_message: String,
    pub actors: Vec<Actor>,
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// Lifecycle of a single combat.
///
/// Transitions only ever move forward, though phases may be skipped
/// (the server can report a combat already ONGOING the first time the
/// client sees it):
///
/// ```text
/// None → KickOff → Ongoing → Complete → PostWait
/// ```
///
/// Serialized as its integer code (0..=4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CombatPhase {
    #[default]
    None,
    KickOff,
    Ongoing,
    Complete,
    PostWait,
}

impl CombatPhase {
    /// Returns `true` if moving from `self` to `target` is a forward step.
    /// Staying in the same phase is not a transition.
    pub fn can_advance_to(self, target: Self) -> bool {
        target > self
    }
}

impl TryFrom<i32> for CombatPhase {
    type Error = ProtocolError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::KickOff),
            2 => Ok(Self::Ongoing),
            3 => Ok(Self::Complete),
            4 => Ok(Self::PostWait),
            other => Err(ProtocolError::InvalidMessage(format!(
                "combat phase {other} out of range"
            ))),
        }
    }
}

impl From<CombatPhase> for i32 {
    fn from(phase: CombatPhase) -> Self {
        phase as i32
    }
}

impl fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::KickOff => "KICK_OFF",
            Self::Ongoing => "ONGOING",
            Self::Complete => "COMPLETE",
            Self::PostWait => "POST_WAIT",
        };
        f.write_str(name)
    }
}

/// Outcome of a combat, from the hero party's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CombatResult {
    #[default]
    None,
    HeroWin,
    HeroLose,
}

impl TryFrom<i32> for CombatResult {
    type Error = ProtocolError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::HeroWin),
            2 => Ok(Self::HeroLose),
            other => Err(ProtocolError::InvalidMessage(format!(
                "combat result {other} out of range"
            ))),
        }
    }
}

impl From<CombatResult> for i32 {
    fn from(result: CombatResult) -> Self {
        result as i32
    }
}

impl fmt::Display for CombatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::HeroWin => "HERO_WIN",
            Self::HeroLose => "HERO_LOSE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusEffect {
    pub name: String,
    pub description: String,
    pub rounds: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub effect: String,
}

/// One round of a combat. `round_turns` lists actor names in turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Round {
    pub tag: String,
    pub round_turns: Vec<String>,
    pub stage_environment: String,
    pub select_report: BTreeMap<String, String>,
    pub stage_director_calculation: String,
    pub stage_director_performance: String,
    pub feedback_report: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combat {
    pub name: String,
    pub phase: CombatPhase,
    pub result: CombatResult,
    pub rounds: Vec<Round>,
    pub summarize_report: BTreeMap<String, String>,
}

impl Combat {
    /// Moves the combat to a later phase.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if `phase` is not after the
    /// current phase.
    pub fn advance(&mut self, phase: CombatPhase) -> Result<(), ProtocolError> {
        if !self.phase.can_advance_to(phase) {
            return Err(ProtocolError::InvalidMessage(format!(
                "combat {} cannot move from {} to {}",
                self.name, self.phase, phase
            )));
        }
        self.phase = phase;
        Ok(())
    }

    /// Records the outcome. Only valid while the combat is COMPLETE.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] in any other phase.
    pub fn finish(&mut self, result: CombatResult) -> Result<(), ProtocolError> {
        if self.phase != CombatPhase::Complete {
            return Err(ProtocolError::InvalidMessage(format!(
                "combat {} cannot record a result during {}",
                self.name, self.phase
            )));
        }
        self.result = result;
        Ok(())
    }

    /// Returns `true` if `result` is consistent with `phase`: a result is
    /// only present once the combat has reached COMPLETE.
    pub fn is_consistent(&self) -> bool {
        self.result == CombatResult::None || self.phase >= CombatPhase::Complete
    }

    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }
}

/// Ordered history of combats within one dungeon run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    pub combats: Vec<Combat>,
}

/// A dungeon run: its levels, combat history, and where the party is.
///
/// `position` is -1 before the run starts, otherwise an index into `levels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dungeon {
    pub name: String,
    pub levels: Vec<Stage>,
    pub engagement: Engagement,
    pub position: i32,
}

impl Default for Dungeon {
    fn default() -> Self {
        Self {
            name: String::new(),
            levels: Vec::new(),
            engagement: Engagement::default(),
            position: -1,
        }
    }
}

impl Dungeon {
    pub fn is_started(&self) -> bool {
        self.position >= 0
    }

    /// Returns `true` if `position` is -1 or a valid index into `levels`.
    pub fn has_valid_position(&self) -> bool {
        self.position == -1
            || usize::try_from(self.position).is_ok_and(|i| i < self.levels.len())
    }

    /// The level the party is on, if the run has started.
    pub fn current_level(&self) -> Option<&Stage> {
        usize::try_from(self.position)
            .ok()
            .and_then(|i| self.levels.get(i))
    }

    pub fn latest_combat(&self) -> Option<&Combat> {
        self.engagement.combats.last()
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One component of an actor snapshot: a name plus an untyped data bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSnapshot {
    pub name: String,
    pub data: Value,
}

impl ComponentSnapshot {
    /// Interprets the data bag as a concrete component type.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the data doesn't fit `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        T::deserialize(&self.data).map_err(ProtocolError::Decode)
    }
}

/// A point-in-time, named bag of components describing one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySnapshot {
    pub name: String,
    pub components: Vec<ComponentSnapshot>,
}

impl EntitySnapshot {
    pub fn component(&self, name: &str) -> Option<&ComponentSnapshot> {
        self.components.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandDetail {
    pub skill: String,
    pub targets: Vec<String>,
    pub reason: String,
    pub dialogue: String,
}

/// The skills an actor holds this round, and how it intends to use them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandComponent {
    pub name: String,
    pub skills: Vec<Skill>,
    pub details: Vec<HandDetail>,
}

impl HandComponent {
    pub const COMPONENT_NAME: &'static str = "HandComponent";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpgCharacterProfileComponent {
    pub name: String,
    pub rpg_character_profile: RpgCharacterProfile,
    pub status_effects: Vec<StatusEffect>,
}

impl RpgCharacterProfileComponent {
    pub const COMPONENT_NAME: &'static str = "RPGCharacterProfileComponent";
}

// ---------------------------------------------------------------------------
// Memories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One agent's recent chat history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentShortTermMemory {
    pub name: String,
    pub chat_history: Vec<BaseMessage>,
}
