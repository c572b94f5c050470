//! Plain-text renderings of session state for on-screen panels.
//!
//! Pure functions of their inputs; nothing here writes to the session.

use wayfarer_protocol::{
    Dungeon, EntitySnapshot, HandComponent, Mapping, RpgCharacterProfileComponent,
};

/// Shown by [`agent_logs_text`] when the latest batch produced nothing.
pub const NO_LOGS: &str = "No logs";

/// One line per stage: `"Home: Hero, Ally\n"`.
pub fn mapping_text(mapping: &Mapping) -> String {
    mapping
        .iter()
        .map(|(stage, actors)| format!("{stage}: {}\n", actors.join(", ")))
        .collect()
}

/// The dungeon's name followed by each level (1-based) and who is on it.
pub fn dungeon_overview_text(dungeon: &Dungeon) -> String {
    let mut text = format!("Dungeon = {}\n", dungeon.name);
    for (index, level) in dungeon.levels.iter().enumerate() {
        let monsters: Vec<&str> = level.actors.iter().map(|a| a.name.as_str()).collect();
        text.push_str(&format!("Level {} = {}\n", index + 1, level.name));
        text.push_str(&format!("Monsters = {}\n", monsters.join(", ")));
    }
    text
}

/// Summary of the most recent combat and its latest round.
/// Empty when no combat has happened yet.
pub fn latest_combat_text(dungeon: &Dungeon) -> String {
    let Some(combat) = dungeon.latest_combat() else {
        return String::new();
    };

    let mut text = format!(
        "Last Combat: {}\nPhase: {}\nResult: {}\n",
        combat.name, combat.phase, combat.result
    );
    if let Some(round) = combat.latest_round() {
        text.push_str(&format!("Last Round: {}\n", round.tag));
        text.push_str(&format!("Stage Environment: {}\n", round.stage_environment));
        text.push_str(&format!("Round Turn: {}\n", round.round_turns.join("-->")));
    }
    text
}

/// Renders the components of one actor snapshot that this client knows how
/// to display.
///
/// With `only = Some(names)`, components whose name is not listed are
/// skipped. Components that fail to decode are logged and skipped.
pub fn actor_text(snapshot: &EntitySnapshot, only: Option<&[&str]>) -> String {
    let mut text = String::new();

    for component in &snapshot.components {
        if only.is_some_and(|names| !names.contains(&component.name.as_str())) {
            continue;
        }

        match component.name.as_str() {
            RpgCharacterProfileComponent::COMPONENT_NAME => {
                match component.decode::<RpgCharacterProfileComponent>() {
                    Ok(profile) => text.push_str(&profile_text(&snapshot.name, &profile)),
                    Err(error) => {
                        tracing::warn!(actor = %snapshot.name, %error, "unreadable profile component");
                    }
                }
            }
            HandComponent::COMPONENT_NAME => match component.decode::<HandComponent>() {
                Ok(hand) => text.push_str(&hand_text(&snapshot.name, &hand)),
                Err(error) => {
                    tracing::warn!(actor = %snapshot.name, %error, "unreadable hand component");
                }
            },
            _ => {}
        }
    }

    text
}

fn profile_text(actor: &str, component: &RpgCharacterProfileComponent) -> String {
    let p = &component.rpg_character_profile;
    let mut text = format!(
        "{actor} = HP:{}/{}, Strength:{}, Dexterity:{}, Wisdom:{}, \
         Physical Attack:{}, Physical Defense:{}, Magic Attack:{}, Magic Defense:{}\n",
        p.hp,
        p.max_hp(),
        p.strength(),
        p.dexterity(),
        p.wisdom(),
        p.physical_attack(),
        p.physical_defense(),
        p.magic_attack(),
        p.magic_defense(),
    );

    if !component.status_effects.is_empty() {
        let effects: Vec<String> = component
            .status_effects
            .iter()
            .map(|e| format!("{} ({}, {})", e.name, e.description, e.rounds))
            .collect();
        text.push_str(&format!("Status Effects: {}\n", effects.join(", ")));
    }
    text
}

fn hand_text(actor: &str, hand: &HandComponent) -> String {
    let skills: Vec<String> = hand
        .skills
        .iter()
        .map(|s| format!("{} ({}, {})", s.name, s.description, s.effect))
        .collect();

    let mut text = format!("{actor} Hand: {}\n", skills.join(", "));
    for detail in &hand.details {
        text.push_str(&format!(
            "Skill: {}, Targets: {}\n",
            detail.skill,
            detail.targets.join(", ")
        ));
    }
    text.push('\n');
    text
}

/// The event log, one line per entry, or [`NO_LOGS`] when empty.
pub fn agent_logs_text(logs: &[String]) -> String {
    if logs.is_empty() {
        return NO_LOGS.to_string();
    }
    logs.iter().map(|line| format!("{line}\n")).collect()
}
