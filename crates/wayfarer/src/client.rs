//! `GameClient` builder and flow orchestrators.
//!
//! This is the entry point for talking to a Wayfarer game server. It ties
//! together all the layers: transport → protocol → session, plus the
//! texture cache.
//!
//! Every flow follows the same shape: resolve the endpoint, execute the
//! request, decode the body, check the application `error` code, and only
//! then touch the session. A flow that fails at any step leaves the
//! session exactly as it was.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;
use wayfarer_cache::ResourceCache;
use wayfarer_protocol::{
    ApiEndpointsResponse, ApiResponse, BasicResponse, Codec, GameplayRequest,
    GameplayResponse, GenerateImagesRequest, GenerateImagesResponse, ImageInfo,
    ImageListResponse, JsonCodec, LoginRequest, LogoutRequest,
    StageTransitionRequest, StartRequest, UserInput, ViewActorResponse,
    ViewDungeonResponse, ViewHomeResponse,
};
use wayfarer_session::{EndpointKind, GameSession};
use wayfarer_transport::{HttpTransport, RequestClient, TransportError, build_url_with_query};

use crate::{ClientConfig, WayfarerError};

/// Path of the image service's generate endpoint.
const GENERATE_IMAGES_PATH: &str = "/api/generate";

/// Path of the image service's listing endpoint.
const LIST_IMAGES_PATH: &str = "/api/images";

/// Raw image bytes fetched for display, keyed in the cache by `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub url: String,
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`GameClient`].
///
/// # Example
///
/// ```rust,ignore
/// use wayfarer::prelude::*;
///
/// let mut client = GameClientBuilder::new()
///     .server_url("http://localhost:8000/api_endpoints/v1/")
///     .build(ReqwestTransport::new());
///
/// let cancel = client.child_token();
/// client.boot(&cancel).await?;
/// client.login("alice", "demo", &cancel).await?;
/// ```
pub struct GameClientBuilder {
    config: ClientConfig,
}

impl GameClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the URL the endpoint table is fetched from.
    pub fn server_url(mut self, url: &str) -> Self {
        self.config.server_url = url.to_string();
        self
    }

    /// Sets the image service base URL.
    pub fn image_server_url(mut self, url: &str) -> Self {
        self.config.image_server_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn request_config(mut self, request: wayfarer_transport::RequestConfig) -> Self {
        self.config.request = request;
        self
    }

    pub fn cache_config(mut self, cache: wayfarer_cache::CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    /// Builds the client on top of `transport` with a fresh session.
    pub fn build<T: HttpTransport>(self, transport: T) -> GameClient<T> {
        GameClient {
            session: GameSession::new(),
            requests: RequestClient::new(transport, self.config.request.clone()),
            textures: ResourceCache::new(self.config.cache.clone()),
            codec: JsonCodec,
            shutdown: CancellationToken::new(),
            config: self.config,
        }
    }
}

impl Default for GameClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// GameClient
// ---------------------------------------------------------------------------

/// One player's connection to a game server.
///
/// Owns the [`GameSession`]; flows take `&mut self`, so at most one flow
/// mutates the session at a time. The texture cache is shared and may be
/// cloned out via [`textures()`](Self::textures) for use elsewhere.
pub struct GameClient<T: HttpTransport> {
    session: GameSession,
    requests: RequestClient<T>,
    textures: ResourceCache<Texture>,
    codec: JsonCodec,
    shutdown: CancellationToken,
    config: ClientConfig,
}

#[cfg(feature = "reqwest")]
impl GameClient<wayfarer_transport::ReqwestTransport> {
    /// Builds a client over `reqwest` using [`ClientConfig::from_env`].
    pub fn from_env() -> Self {
        GameClientBuilder::new()
            .config(ClientConfig::from_env())
            .build(wayfarer_transport::ReqwestTransport::new())
    }
}

impl<T: HttpTransport> GameClient<T> {
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn textures(&self) -> &ResourceCache<Texture> {
        &self.textures
    }

    /// A token for one flow. Cancelling it stops that flow's pending
    /// retries; [`shutdown()`](Self::shutdown) cancels every child.
    pub fn child_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Cancels all outstanding flows. Tokens handed out afterwards start
    /// out cancelled.
    pub fn shutdown(&self) {
        tracing::info!("game client shutting down");
        self.shutdown.cancel();
    }

    // -- Boot and identity --------------------------------------------------

    /// Fetches the endpoint table. Every other game-server flow needs this
    /// first.
    pub async fn boot(&mut self, cancel: &CancellationToken) -> Result<(), WayfarerError> {
        let url = self.config.server_url.clone();
        let response: ApiEndpointsResponse = self.get(&url, cancel).await?;
        self.session.try_set_endpoints(response.api_endpoints)?;
        tracing::info!(server = %url, "endpoint table loaded");
        Ok(())
    }

    /// Logs in as `user_name` playing `game_name`. The names are stored
    /// only once the server accepts them.
    pub async fn login(
        &mut self,
        user_name: &str,
        game_name: &str,
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        let mut next = self.session.clone();
        next.try_set_user_name(Some(user_name.to_string()))?;
        next.try_set_game_name(Some(game_name.to_string()))?;

        let url = self.session.url(EndpointKind::Login)?;
        let request = LoginRequest {
            user_name: user_name.to_string(),
            game_name: game_name.to_string(),
        };
        let _: BasicResponse = self.post(&url, &request, cancel).await?;

        self.session = next;
        tracing::info!(user = user_name, game = game_name, "logged in");
        Ok(())
    }

    /// Starts the game as `actor_name`.
    pub async fn start(
        &mut self,
        actor_name: &str,
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        self.require_login()?;
        let mut next = self.session.clone();
        next.try_set_actor_name(Some(actor_name.to_string()))?;

        let url = self.session.url(EndpointKind::Start)?;
        let request = StartRequest {
            user_name: self.session.user_name().to_string(),
            game_name: self.session.game_name().to_string(),
            actor_name: actor_name.to_string(),
        };
        let _: BasicResponse = self.post(&url, &request, cancel).await?;

        self.session = next;
        tracing::info!(actor = actor_name, "game started");
        Ok(())
    }

    pub async fn logout(&mut self, cancel: &CancellationToken) -> Result<(), WayfarerError> {
        self.require_login()?;
        let url = self.session.url(EndpointKind::Logout)?;
        let request = LogoutRequest {
            user_name: self.session.user_name().to_string(),
            game_name: self.session.game_name().to_string(),
        };
        let _: BasicResponse = self.post(&url, &request, cancel).await?;

        self.session.clear_identity();
        tracing::info!("logged out");
        Ok(())
    }

    // -- Views --------------------------------------------------------------

    /// Refreshes the stage → actors mapping.
    pub async fn view_home(&mut self, cancel: &CancellationToken) -> Result<(), WayfarerError> {
        self.require_login()?;
        let url = self.session.url(EndpointKind::ViewHome)?;
        let response: ViewHomeResponse = self.get(&url, cancel).await?;
        self.session.try_set_mapping(response.mapping)?;
        Ok(())
    }

    /// Refreshes mapping and dungeon together. If either is refused,
    /// neither is stored.
    pub async fn view_dungeon(&mut self, cancel: &CancellationToken) -> Result<(), WayfarerError> {
        self.require_login()?;
        let url = self.session.url(EndpointKind::ViewDungeon)?;
        let response: ViewDungeonResponse = self.get(&url, cancel).await?;

        let mut next = self.session.clone();
        next.try_set_mapping(response.mapping)?;
        next.try_set_dungeon(response.dungeon)?;
        self.session = next;
        Ok(())
    }

    /// Fetches snapshots and short-term memories for `actors`. An empty
    /// list asks the server for everyone.
    pub async fn view_actors(
        &mut self,
        actors: &[&str],
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        self.require_login()?;
        let base = self.session.url(EndpointKind::ViewActor)?;
        let url = if actors.is_empty() {
            build_url_with_query(&base, [("actors", "")])?
        } else {
            build_url_with_query(&base, actors.iter().map(|name| ("actors", *name)))?
        };
        let response: ViewActorResponse = self.get(&url, cancel).await?;

        let mut next = self.session.clone();
        next.try_set_actor_snapshots(response.actor_snapshots)?;
        next.try_set_short_term_memories(response.agent_short_term_memories)?;
        self.session = next;
        Ok(())
    }

    // -- Gameplay -----------------------------------------------------------

    /// Sends a home action and replaces the event batch with the reply.
    pub async fn home_gameplay(
        &mut self,
        input: UserInput,
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        self.gameplay(EndpointKind::HomeGameplay, input, cancel).await
    }

    /// Sends a dungeon action and replaces the event batch with the reply.
    pub async fn dungeon_gameplay(
        &mut self,
        input: UserInput,
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        self.gameplay(EndpointKind::DungeonGameplay, input, cancel).await
    }

    pub async fn home_trans_dungeon(&mut self, cancel: &CancellationToken) -> Result<(), WayfarerError> {
        self.transition(EndpointKind::HomeTransDungeon, cancel).await
    }

    pub async fn dungeon_trans_home(&mut self, cancel: &CancellationToken) -> Result<(), WayfarerError> {
        self.transition(EndpointKind::DungeonTransHome, cancel).await
    }

    async fn gameplay(
        &mut self,
        kind: EndpointKind,
        input: UserInput,
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        self.require_login()?;
        let url = self.session.url(kind)?;
        let tag = input.tag.clone();
        let request = GameplayRequest {
            user_name: self.session.user_name().to_string(),
            game_name: self.session.game_name().to_string(),
            user_input: input,
        };
        let response: GameplayResponse = self.post(&url, &request, cancel).await?;

        self.session
            .process_client_messages(response.client_messages.as_deref().unwrap_or_default());
        tracing::debug!(
            endpoint = %kind,
            tag = %tag,
            events = self.session.agent_events().len(),
            "gameplay step applied"
        );
        Ok(())
    }

    async fn transition(
        &mut self,
        kind: EndpointKind,
        cancel: &CancellationToken,
    ) -> Result<(), WayfarerError> {
        self.require_login()?;
        let url = self.session.url(kind)?;
        let request = StageTransitionRequest {
            user_name: self.session.user_name().to_string(),
            game_name: self.session.game_name().to_string(),
        };
        let _: BasicResponse = self.post(&url, &request, cancel).await?;
        tracing::info!(endpoint = %kind, "stage transition accepted");
        Ok(())
    }

    // -- Textures and images ------------------------------------------------

    /// Returns the texture at `url`, fetching it once no matter how many
    /// callers ask concurrently.
    ///
    /// The shared fetch is not tied to any caller's token; only
    /// [`shutdown()`](Self::shutdown) stops its retries. Cancelling `cancel`
    /// abandons this caller's wait with [`TransportError::Cancelled`] while
    /// the other waiters keep loading. A fetch nobody waits on any more is
    /// not polled and resumes when the next caller joins it.
    pub async fn load_texture(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<Texture>, WayfarerError> {
        let requests = self.requests.clone();
        let load_cancel = self.shutdown.child_token();
        let owned = url.to_string();

        let load = self.textures.get_or_load(url, move || async move {
            let bytes = requests.get_bytes(&owned, &load_cancel).await.into_result()?;
            Ok::<_, TransportError>(Texture { url: owned, bytes })
        });

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(url, "texture wait cancelled");
                Err(TransportError::Cancelled.into())
            }
            texture = load => Ok(texture?),
        }
    }

    /// Asks the image service to render `prompts`, between one and
    /// [`GenerateImagesRequest::MAX_PROMPTS`] of them.
    pub async fn generate_images(
        &self,
        prompts: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImageInfo>, WayfarerError> {
        if prompts.is_empty() {
            return Err(WayfarerError::InvalidRequest("no prompts given".into()));
        }
        if prompts.len() > GenerateImagesRequest::MAX_PROMPTS {
            return Err(WayfarerError::InvalidRequest(format!(
                "{} prompts given, at most {} allowed",
                prompts.len(),
                GenerateImagesRequest::MAX_PROMPTS
            )));
        }

        let url = format!("{}{GENERATE_IMAGES_PATH}", self.config.image_server_url);
        let body = self.codec.encode(&GenerateImagesRequest::with_prompts(prompts))?;
        let body = self.requests.post_json(&url, body, cancel).await.into_result()?;
        let response: GenerateImagesResponse = self.codec.decode(&body)?;

        if !response.success {
            tracing::warn!(url = %url, reason = %response.message, "image generation failed");
            return Err(WayfarerError::ImageService(response.message));
        }
        tracing::info!(count = response.images.len(), "images generated");
        Ok(response.images)
    }

    /// Filenames the image service currently holds.
    pub async fn list_images(&self, cancel: &CancellationToken) -> Result<Vec<String>, WayfarerError> {
        let url = format!("{}{LIST_IMAGES_PATH}", self.config.image_server_url);
        let body = self.requests.get(&url, cancel).await.into_result()?;
        let response: ImageListResponse = self.codec.decode(&body)?;
        Ok(response.images)
    }

    /// Turns an `image_url` from the image service into an absolute URL.
    /// Absolute inputs are returned unchanged.
    pub fn resolve_image_url(&self, image_url: &str) -> Result<String, WayfarerError> {
        let base = Url::parse(&self.config.image_server_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.config.image_server_url)))?;
        let resolved = base
            .join(image_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{image_url}: {e}")))?;
        Ok(resolved.into())
    }

    // -- Request plumbing ---------------------------------------------------

    fn require_login(&self) -> Result<(), WayfarerError> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err(WayfarerError::NotLoggedIn)
        }
    }

    async fn get<R>(&self, url: &str, cancel: &CancellationToken) -> Result<R, WayfarerError>
    where
        R: DeserializeOwned + ApiResponse,
    {
        let body = self.requests.get(url, cancel).await.into_result()?;
        self.accept(url, &body)
    }

    async fn post<B, R>(&self, url: &str, request: &B, cancel: &CancellationToken) -> Result<R, WayfarerError>
    where
        B: Serialize,
        R: DeserializeOwned + ApiResponse,
    {
        let body = self.codec.encode(request)?;
        let body = self.requests.post_json(url, body, cancel).await.into_result()?;
        self.accept(url, &body)
    }

    /// Decodes a 2xx body and turns a nonzero `error` into
    /// [`WayfarerError::Application`].
    fn accept<R>(&self, url: &str, body: &[u8]) -> Result<R, WayfarerError>
    where
        R: DeserializeOwned + ApiResponse,
    {
        let response: R = self.codec.decode(body).inspect_err(|e| {
            tracing::warn!(url, error = %e, "response body did not decode");
        })?;

        if !response.is_success() {
            tracing::warn!(
                url,
                code = response.error(),
                reason = response.message(),
                "server rejected request"
            );
            return Err(WayfarerError::Application {
                code: response.error(),
                message: response.message().to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_transport::{HttpRequest, RawResponse};

    struct Offline;

    impl HttpTransport for Offline {
        async fn send(&self, _request: &HttpRequest) -> Result<RawResponse, TransportError> {
            Err(TransportError::Connection("offline".into()))
        }
    }

    fn client() -> GameClient<Offline> {
        GameClientBuilder::new()
            .image_server_url("http://img:8300/")
            .build(Offline)
    }

    #[test]
    fn test_builder_trims_image_server_slash() {
        assert_eq!(client().config().image_server_url, "http://img:8300");
    }

    #[test]
    fn test_resolve_relative_image_url() {
        let url = client().resolve_image_url("/images/cat.png").unwrap();
        assert_eq!(url, "http://img:8300/images/cat.png");
    }

    #[test]
    fn test_resolve_absolute_image_url_unchanged() {
        let url = client().resolve_image_url("http://cdn/x.png").unwrap();
        assert_eq!(url, "http://cdn/x.png");
    }

    #[test]
    fn test_shutdown_cancels_children() {
        let client = client();
        let before = client.child_token();
        client.shutdown();
        assert!(before.is_cancelled());
        assert!(client.child_token().is_cancelled());
    }

    #[test]
    fn test_require_login() {
        assert!(matches!(client().require_login(), Err(WayfarerError::NotLoggedIn)));
    }
}
