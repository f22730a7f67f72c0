/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Authentication module for the Keycloak admin API
//!
//! This module owns the session state of a client:
//! - Login with a static token, client credentials, password grant or mutual TLS
//! - Refresh after Keycloak rejected a token, serialized so that concurrent
//!   callers trigger a single refresh
//! - Server version discovery, cached for the life of the client

use crate::application::config::Config;
use crate::application::version::ServerVersion;
use crate::error::AppError;
use crate::model::auth::{ClientCredentials, Grant, GrantType, TokenResponse, TokenSet};
use crate::model::http::{RequestBody, make_http_request};
use crate::model::responses::ServerInfoResponse;
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, error, info, warn};

/// What a request needs to authenticate itself
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// `Authorization` header value, `None` in mutual TLS mode
    pub authorization: Option<String>,
    /// Generation of the tokens this session was built from
    pub generation: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authorized", &self.authorization.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Default)]
struct TokenState {
    tokens: Option<TokenSet>,
    /// Bumped on every successful login or refresh; 0 means never logged in
    generation: u64,
}

impl TokenState {
    fn session(&self) -> Session {
        Session {
            authorization: self.tokens.as_ref().map(TokenSet::authorization),
            generation: self.generation,
        }
    }
}

/// Authentication manager for the Keycloak admin API
///
/// Token state is replaced wholesale under a lock, so readers never observe a
/// half-updated token set. Logins and refreshes are serialized by a second lock.
pub struct Auth {
    config: Arc<Config>,
    client: Client,
    grant: Grant,
    state: RwLock<TokenState>,
    refresh_lock: Mutex<()>,
    version: OnceCell<ServerVersion>,
}

impl Auth {
    /// Creates a new Auth instance
    ///
    /// # Arguments
    /// * `config` - Configuration containing credentials and server settings
    /// * `client` - Transport shared with the admin API calls
    ///
    /// # Returns
    /// * `Err(AppError::Config)` - If no credential mode can be resolved
    pub fn new(config: Arc<Config>, client: Client) -> Result<Self, AppError> {
        let grant = Grant::resolve(&config.credentials, &config.tls)?;
        debug!("Resolved credential mode: {}", grant.kind());

        Ok(Self {
            config,
            client,
            grant,
            state: RwLock::new(TokenState::default()),
            refresh_lock: Mutex::new(()),
            version: OnceCell::new(),
        })
    }

    /// Credential mode in use
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        self.grant.kind()
    }

    /// Whether a rejected token can be replaced
    #[must_use]
    pub fn supports_refresh(&self) -> bool {
        self.grant.supports_refresh()
    }

    /// Snapshot of the current session state
    pub async fn credentials(&self) -> ClientCredentials {
        let state = self.state.read().await;
        ClientCredentials::snapshot(&self.grant, state.tokens.as_ref(), state.generation)
    }

    /// Cached server version, if discovered already
    #[must_use]
    pub fn cached_version(&self) -> Option<ServerVersion> {
        self.version.get().copied()
    }

    /// Gets the current session, logging in first if that never happened
    pub async fn session(&self) -> Result<Session, AppError> {
        {
            let state = self.state.read().await;
            if state.generation > 0 {
                return Ok(state.session());
            }
        }

        let _guard = self.refresh_lock.lock().await;
        {
            let state = self.state.read().await;
            if state.generation > 0 {
                return Ok(state.session());
            }
        }

        info!("No active session, logging in");
        self.login_locked().await
    }

    /// Performs a fresh login, replacing any tokens held
    ///
    /// Also discovers the server version if it is not cached yet.
    pub async fn login(&self) -> Result<Session, AppError> {
        let _guard = self.refresh_lock.lock().await;
        self.login_locked().await
    }

    /// Replaces a token that Keycloak rejected
    ///
    /// `rejected_generation` is the generation of the session whose token was
    /// rejected. When another caller refreshed in the meantime, the newer session
    /// is returned without contacting Keycloak again.
    ///
    /// Uses the refresh-token grant when a refresh token is held and falls back
    /// to a full login when Keycloak answers 400 to it.
    pub async fn refresh(&self, rejected_generation: u64) -> Result<Session, AppError> {
        if !self.grant.supports_refresh() {
            return Err(AppError::authentication(
                None,
                format!("{} credentials cannot be refreshed", self.grant.kind()),
            ));
        }

        let _guard = self.refresh_lock.lock().await;

        let refresh_token = {
            let state = self.state.read().await;
            if state.generation > 0 && state.generation != rejected_generation {
                debug!(
                    "Token already refreshed (generation {} -> {})",
                    rejected_generation, state.generation
                );
                return Ok(state.session());
            }
            state.tokens.as_ref().and_then(|t| t.refresh_token.clone())
        };

        let tokens = match refresh_token.and_then(|rt| self.grant.refresh_form(&rt)) {
            Some(form) => {
                info!("Refreshing access token");
                match self.request_token(&form).await {
                    Ok(tokens) => Some(tokens),
                    Err(AppError::Authentication {
                        status: Some(StatusCode::BAD_REQUEST),
                        ..
                    }) => {
                        warn!("Refresh token rejected, attempting full re-authentication");
                        self.obtain_tokens().await?
                    }
                    Err(e) => return Err(e),
                }
            }
            None => {
                info!("No refresh token held, logging in again");
                self.obtain_tokens().await?
            }
        };

        let session = self.store(tokens).await;
        info!("✓ Token refreshed successfully");
        Ok(session)
    }

    /// Server version, logging in first when it was never discovered
    pub async fn server_version(&self) -> Result<ServerVersion, AppError> {
        if let Some(version) = self.version.get() {
            return Ok(*version);
        }

        let session = self.session().await?;
        let version = self
            .version
            .get_or_try_init(|| self.fetch_server_version(session.authorization.as_deref()))
            .await?;
        Ok(*version)
    }

    async fn login_locked(&self) -> Result<Session, AppError> {
        info!(
            "Logging in to realm {} with {} credentials",
            self.config.server.realm,
            self.grant.kind()
        );

        let tokens = self.obtain_tokens().await?;
        let session = self.store(tokens).await;

        self.version
            .get_or_try_init(|| self.fetch_server_version(session.authorization.as_deref()))
            .await?;

        info!("✓ Login successful");
        Ok(session)
    }

    /// Fresh tokens for the configured grant; `None` in mutual TLS mode
    async fn obtain_tokens(&self) -> Result<Option<TokenSet>, AppError> {
        if let Some(tokens) = self.grant.static_tokens() {
            return Ok(Some(tokens));
        }
        match self.grant.login_form() {
            Some(form) => Ok(Some(self.request_token(&form).await?)),
            None => Ok(None),
        }
    }

    async fn store(&self, tokens: Option<TokenSet>) -> Session {
        let mut state = self.state.write().await;
        state.tokens = tokens;
        state.generation += 1;
        state.session()
    }

    async fn request_token(&self, form: &[(&'static str, String)]) -> Result<TokenSet, AppError> {
        let url = self.config.token_url();
        debug!("Sending token request to: {}", url);

        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                error!("Token request failed: {}", e);
                AppError::authentication(None, format!("error sending POST request to {url}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Token request failed with status {}: {}", status, body);
            return Err(AppError::authentication(
                Some(status),
                format!("error sending POST request to {url}: {status}. Response body: {body}"),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::authentication(Some(status), format!("malformed token response: {e}"))
        })?;

        debug!("Access token expires in {} seconds", token.expires_in);
        Ok(TokenSet::from(token))
    }

    async fn fetch_server_version(
        &self,
        authorization: Option<&str>,
    ) -> Result<ServerVersion, AppError> {
        let url = self.config.server_info_url();

        let response = make_http_request(
            &self.client,
            Method::GET,
            &url,
            authorization,
            &[],
            &RequestBody::Empty,
        )
        .await
        .map_err(|e| match e {
            AppError::TokenRejected(rejected) => {
                AppError::authentication(Some(rejected.status), rejected.to_string())
            }
            other => other,
        })?;

        let info: ServerInfoResponse = response.json()?;
        let version = ServerVersion::parse(&info.system_info.version)?;
        info!("Keycloak server version: {}", version);
        Ok(version)
    }
}
