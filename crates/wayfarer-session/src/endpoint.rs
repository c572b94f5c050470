//! Named endpoints and how they resolve against the boot-time URL table.

use std::fmt;

use wayfarer_protocol::ApiEndpoints;

/// Every endpoint the client calls on the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Test,
    Login,
    Logout,
    Start,
    HomeGameplay,
    HomeTransDungeon,
    DungeonGameplay,
    DungeonTransHome,
    ViewHome,
    ViewDungeon,
    ViewActor,
}

impl EndpointKind {
    pub const ALL: [Self; 11] = [
        Self::Test,
        Self::Login,
        Self::Logout,
        Self::Start,
        Self::HomeGameplay,
        Self::HomeTransDungeon,
        Self::DungeonGameplay,
        Self::DungeonTransHome,
        Self::ViewHome,
        Self::ViewDungeon,
        Self::ViewActor,
    ];

    /// View endpoints are prefixes; the session appends
    /// `{user_name}/{game_name}` each time they are read.
    pub fn is_per_player(self) -> bool {
        matches!(self, Self::ViewHome | Self::ViewDungeon | Self::ViewActor)
    }

    /// The raw table entry for this endpoint.
    pub fn base(self, endpoints: &ApiEndpoints) -> &str {
        match self {
            Self::Test => &endpoints.test_url,
            Self::Login => &endpoints.login_url,
            Self::Logout => &endpoints.logout_url,
            Self::Start => &endpoints.start_url,
            Self::HomeGameplay => &endpoints.home_gameplay_url,
            Self::HomeTransDungeon => &endpoints.home_trans_dungeon_url,
            Self::DungeonGameplay => &endpoints.dungeon_gameplay_url,
            Self::DungeonTransHome => &endpoints.dungeon_trans_home_url,
            Self::ViewHome => &endpoints.view_home_url,
            Self::ViewDungeon => &endpoints.view_dungeon_url,
            Self::ViewActor => &endpoints.view_actor_url,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Test => "TEST_URL",
            Self::Login => "LOGIN_URL",
            Self::Logout => "LOGOUT_URL",
            Self::Start => "START_URL",
            Self::HomeGameplay => "HOME_GAMEPLAY_URL",
            Self::HomeTransDungeon => "HOME_TRANS_DUNGEON_URL",
            Self::DungeonGameplay => "DUNGEON_GAMEPLAY_URL",
            Self::DungeonTransHome => "DUNGEON_TRANS_HOME_URL",
            Self::ViewHome => "VIEW_HOME_URL",
            Self::ViewDungeon => "VIEW_DUNGEON_URL",
            Self::ViewActor => "VIEW_ACTOR_URL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_view_endpoints_are_per_player() {
        let per_player: Vec<_> = EndpointKind::ALL
            .into_iter()
            .filter(|k| k.is_per_player())
            .collect();
        assert_eq!(
            per_player,
            vec![
                EndpointKind::ViewHome,
                EndpointKind::ViewDungeon,
                EndpointKind::ViewActor
            ]
        );
    }

    #[test]
    fn test_base_reads_matching_field() {
        let endpoints = ApiEndpoints {
            login_url: "http://h/login/".into(),
            dungeon_trans_home_url: "http://h/home/".into(),
            ..Default::default()
        };
        assert_eq!(EndpointKind::Login.base(&endpoints), "http://h/login/");
        assert_eq!(EndpointKind::DungeonTransHome.base(&endpoints), "http://h/home/");
        assert_eq!(EndpointKind::Start.base(&endpoints), "");
    }
}
