//! Request and response bodies for every game-server endpoint.
//!
//! Every response carries `error` and `message`. `error == 0` is success;
//! anything else is an application error whose `message` is meant for the
//! player. The [`ApiResponse`] trait gives flows one way to check that
//! regardless of which endpoint they called.
//!
//! Data fields on responses are `Option`s on purpose: a response that
//! omits `mapping` must be distinguishable from one that sends an empty
//! mapping, so the session can refuse to overwrite good state with nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AgentShortTermMemory, ClientMessage, Dungeon, EntitySnapshot, Mapping};

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// Common shape of every server response.
pub trait ApiResponse {
    /// Application error code. `0` means success.
    fn error(&self) -> i32;

    /// Human-readable status or error message.
    fn message(&self) -> &str;

    fn is_success(&self) -> bool {
        self.error() == 0
    }
}

/// Implements [`ApiResponse`] for structs with `error` and `message` fields.
macro_rules! api_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn error(&self) -> i32 {
                    self.error
                }

                fn message(&self) -> &str {
                    &self.message
                }
            }
        )+
    };
}

api_response!(
    ApiEndpointsResponse,
    BasicResponse,
    ViewHomeResponse,
    ViewDungeonResponse,
    ViewActorResponse,
    GameplayResponse,
);

// ---------------------------------------------------------------------------
// Endpoint table
// ---------------------------------------------------------------------------

/// The named URL table fetched at boot.
///
/// Field names on the wire are SCREAMING_SNAKE_CASE (`LOGIN_URL`, ...).
/// The three `view_*` entries are prefixes: the session appends
/// `{user_name}/{game_name}` when resolving them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ApiEndpoints {
    pub test_url: String,
    pub login_url: String,
    pub logout_url: String,
    pub start_url: String,
    pub home_gameplay_url: String,
    pub home_trans_dungeon_url: String,
    pub dungeon_gameplay_url: String,
    pub dungeon_trans_home_url: String,
    pub view_home_url: String,
    pub view_dungeon_url: String,
    pub view_actor_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpointsResponse {
    #[serde(default)]
    pub api_endpoints: Option<ApiEndpoints>,
    #[serde(default)]
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user_name: String,
    pub game_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub user_name: String,
    pub game_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub user_name: String,
    pub game_name: String,
    pub actor_name: String,
}

/// Body for both home → dungeon and dungeon → home transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransitionRequest {
    pub user_name: String,
    pub game_name: String,
}

/// What the player asked for: a tag naming the action plus free-form
/// string arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub tag: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl UserInput {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            data: BTreeMap::new(),
        }
    }

    /// Adds one argument, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Body for both home and dungeon gameplay calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameplayRequest {
    pub user_name: String,
    pub game_name: String,
    pub user_input: UserInput,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response for endpoints that only report success or failure
/// (login, start, logout, stage transitions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicResponse {
    #[serde(default)]
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewHomeResponse {
    #[serde(default)]
    pub mapping: Option<Mapping>,
    #[serde(default)]
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDungeonResponse {
    #[serde(default)]
    pub mapping: Option<Mapping>,
    #[serde(default)]
    pub dungeon: Option<Dungeon>,
    #[serde(default)]
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewActorResponse {
    #[serde(default)]
    pub actor_snapshots: Option<Vec<EntitySnapshot>>,
    #[serde(default)]
    pub agent_short_term_memories: Option<Vec<AgentShortTermMemory>>,
    #[serde(default)]
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameplayResponse {
    #[serde(default)]
    pub client_messages: Option<Vec<ClientMessage>>,
    #[serde(default)]
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoints_use_screaming_snake_case_on_the_wire() {
        let response: ApiEndpointsResponse = serde_json::from_value(json!({
            "api_endpoints": {
                "LOGIN_URL": "http://h/login/",
                "VIEW_ACTOR_URL": "http://h/actors/v1/"
            },
            "error": 0,
            "message": "ok"
        }))
        .unwrap();

        let endpoints = response.api_endpoints.unwrap();
        assert_eq!(endpoints.login_url, "http://h/login/");
        assert_eq!(endpoints.view_actor_url, "http://h/actors/v1/");
        assert_eq!(endpoints.start_url, "");
    }

    #[test]
    fn test_missing_data_field_is_absent_not_empty() {
        let response: ViewDungeonResponse =
            serde_json::from_value(json!({"error": 0, "message": ""})).unwrap();
        assert!(response.mapping.is_none());
        assert!(response.dungeon.is_none());

        let response: ViewHomeResponse =
            serde_json::from_value(json!({"mapping": {}, "error": 0})).unwrap();
        assert_eq!(response.mapping, Some(Mapping::new()));
    }

    #[test]
    fn test_api_response_success_convention() {
        let ok = BasicResponse { error: 0, message: "fine".into() };
        let failed = BasicResponse { error: 1001, message: "no such user".into() };
        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert_eq!(failed.message(), "no such user");
    }

    #[test]
    fn test_gameplay_request_wire_shape() {
        let request = GameplayRequest {
            user_name: "u".into(),
            game_name: "g".into(),
            user_input: UserInput::new("/advancing").with("target", "Goblin"),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "user_name": "u",
                "game_name": "g",
                "user_input": {"tag": "/advancing", "data": {"target": "Goblin"}}
            })
        );
    }
}
