//! Integration tests for the session store: event batches, guarded writes,
//! and mapping queries working together through the public API.

use serde_json::json;
use wayfarer_protocol::{AgentEvent, AgentEventHead, ClientMessage, Mapping};
use wayfarer_session::{GameSession, SessionError, display};

// =========================================================================
// Helpers
// =========================================================================

fn event(body: serde_json::Value) -> ClientMessage {
    ClientMessage::agent_event(body.to_string())
}

fn speak(speaker: &str, listener: &str, dialogue: &str) -> ClientMessage {
    event(json!({
        "head": 1,
        "speaker": speaker,
        "listener": listener,
        "dialogue": dialogue,
    }))
}

fn mapping(entries: &[(&str, &[&str])]) -> Mapping {
    entries
        .iter()
        .map(|(stage, actors)| {
            (
                stage.to_string(),
                actors.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

// =========================================================================
// process_client_messages()
// =========================================================================

#[test]
fn test_process_empty_batch_clears_previous() {
    let mut session = GameSession::new();
    session.process_client_messages(&[speak("X", "Y", "hi")]);
    assert_eq!(session.agent_events().len(), 1);

    session.process_client_messages(&[]);
    assert!(session.agent_events().is_empty());
    assert!(session.agent_event_logs().is_empty());

    // Idempotent on empty input.
    session.process_client_messages(&[]);
    assert!(session.agent_event_logs().is_empty());
}

#[test]
fn test_process_preserves_order() {
    let mut session = GameSession::new();
    session.process_client_messages(&[
        speak("A", "B", "one"),
        event(json!({"head": 4, "speaker": "B", "dialogue": "two"})),
        event(json!({"head": 2, "speaker": "C", "listener": "A", "dialogue": "three"})),
    ]);

    assert_eq!(
        session.agent_event_logs(),
        ["A : @B one", "B % two", "C : ......A three"]
    );
    let heads: Vec<_> = session.agent_events().iter().map(AgentEvent::head).collect();
    assert_eq!(
        heads,
        [AgentEventHead::Speak, AgentEventHead::MindVoice, AgentEventHead::Whisper]
    );
}

#[test]
fn test_process_speak_log_line() {
    let mut session = GameSession::new();
    session.process_client_messages(&[speak("X", "Y", "hi")]);
    assert_eq!(session.agent_event_logs(), ["X : @Y hi"]);
}

#[test]
fn test_process_replaces_rather_than_accumulates() {
    let mut session = GameSession::new();
    session.process_client_messages(&[speak("A", "B", "first")]);
    session.process_client_messages(&[speak("C", "D", "second")]);
    assert_eq!(session.agent_event_logs(), ["C : @D second"]);
}

#[test]
fn test_process_bad_item_is_isolated() {
    let mut session = GameSession::new();
    session.process_client_messages(&[
        speak("A", "B", "before"),
        ClientMessage::agent_event("{not json"),
        event(json!({"head": 99})),
        event(json!({"head": 3, "announcement_speaker": "Herald"})),
        speak("A", "B", "after"),
    ]);

    let logs = session.agent_event_logs();
    assert_eq!(logs.len(), 5);
    assert_eq!(logs[0], "A : @B before");
    assert_eq!(logs[1], "{not json");
    assert_eq!(logs[4], "A : @B after");
    for event in &session.agent_events()[1..4] {
        assert_eq!(event.head(), AgentEventHead::None);
    }
}

#[test]
fn test_process_combat_events_and_announce() {
    let mut session = GameSession::new();
    session.process_client_messages(&[
        event(json!({"head": 5, "actor": "Hero", "description": "draws steel"})),
        event(json!({"head": 6, "actor": "Hero", "summary": "victory"})),
        event(json!({
            "head": 3,
            "announcement_speaker": "Herald",
            "event_stage": "Square",
            "announcement_message": "hear ye"
        })),
    ]);
    assert_eq!(
        session.agent_event_logs(),
        ["Hero => draws steel", "Hero => victory", "Herald(Square) : !!hear ye"]
    );
    assert_eq!(
        display::agent_logs_text(session.agent_event_logs()),
        "Hero => draws steel\nHero => victory\nHerald(Square) : !!hear ye\n"
    );
}

// =========================================================================
// Guarded writes
// =========================================================================

#[test]
fn test_set_mapping_none_keeps_old() {
    let mut session = GameSession::new();
    let original = mapping(&[("Home", &["Hero", "Ally"])]);
    session.try_set_mapping(Some(original.clone())).unwrap();

    let result = session.try_set_mapping(None);
    assert_eq!(result, Err(SessionError::MissingValue { field: "mapping" }));
    assert_eq!(session.mapping(), &original);
}

#[test]
fn test_set_mapping_shared_actor_keeps_old() {
    let mut session = GameSession::new();
    let original = mapping(&[("Home", &["Hero"])]);
    session.try_set_mapping(Some(original.clone())).unwrap();

    let result = session.try_set_mapping(Some(mapping(&[("Home", &["Hero"]), ("Dungeon", &["Hero"])])));
    assert!(matches!(result, Err(SessionError::ActorInMultipleStages { .. })));
    assert_eq!(session.mapping(), &original);
}

#[test]
fn test_other_setters_refuse_none() {
    let mut session = GameSession::new();
    assert!(session.try_set_endpoints(None).is_err());
    assert!(session.try_set_dungeon(None).is_err());
    assert!(session.try_set_actor_snapshots(None).is_err());
    assert!(session.try_set_short_term_memories(None).is_err());
    assert!(session.try_set_actor_name(None).is_err());
    assert_eq!(session.dungeon().position, -1);
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn test_retrieve_actors_for_stage_through_session() {
    let mut session = GameSession::new();
    session
        .try_set_mapping(Some(mapping(&[("Home", &["Hero", "Ally"]), ("Dungeon", &["Goblin"])])))
        .unwrap();

    assert_eq!(session.retrieve_actors_for_stage("Hero").unwrap(), ["Hero", "Ally"]);
    assert_eq!(session.actor_location("Goblin").unwrap(), Some("Dungeon"));
    assert!(session.retrieve_actors_for_stage("Nobody").unwrap().is_empty());
    assert_eq!(
        display::mapping_text(session.mapping()),
        "Dungeon: Goblin\nHome: Hero, Ally\n"
    );
}
