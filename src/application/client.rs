/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Client for the Keycloak admin REST API
//!
//! This module provides the client resource mappers talk to. It handles:
//! - Login on construction or on the first request
//! - Transparent refresh and a single resend when Keycloak rejects the token
//! - JSON encoding of request bodies and decoding of responses
//! - Server version queries
//!
//! # Example
//! ```ignore
//! use keycloak_admin_client::prelude::*;
//!
//! let client = KeycloakClient::new(Config::new()).await?;
//!
//! let realm: serde_json::Value = client.get("/realms/test", &[]).await?;
//! let created = client.post("/realms/test/organizations", &organization).await?;
//! let id = created.id();
//! ```

use crate::application::auth::Auth;
use crate::application::config::Config;
use crate::application::version::{ServerVersion, VersionGate};
use crate::constants::MAX_AUTH_RETRIES;
use crate::error::AppError;
use crate::model::auth::{ClientCredentials, GrantType};
use crate::model::http::{ApiResponse, RequestBody, build_http_client, make_http_request};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Client for the Keycloak admin API with automatic authentication
///
/// One instance is meant to be shared (behind an [`Arc`]) by every resource
/// operation of a run. All verbs take `&self` and may run concurrently.
///
/// Dropping the future returned by any method aborts the HTTP exchange in flight.
pub struct KeycloakClient {
    auth: Arc<Auth>,
    http_client: Client,
    config: Arc<Config>,
}

impl KeycloakClient {
    /// Creates a new client and, unless `initial_login` is disabled, logs in
    ///
    /// # Arguments
    /// * `config` - Configuration containing credentials and server settings
    ///
    /// # Returns
    /// * `Ok(KeycloakClient)` - Client ready to use
    /// * `Err(AppError)` - If the configuration is invalid or login fails
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let client = Self::new_lazy(config)?;

        if client.config.server.initial_login {
            client.auth.login().await?;
        }

        Ok(client)
    }

    /// Creates a new client without logging in
    ///
    /// Login happens on the first request or version query.
    pub fn new_lazy(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let http_client = build_http_client(&config)?;
        let auth = Arc::new(Auth::new(config.clone(), http_client.clone())?);

        Ok(Self {
            auth,
            http_client,
            config,
        })
    }

    /// Makes a GET request and decodes the JSON answer
    ///
    /// # Arguments
    /// * `path` - Admin API path, e.g. `/realms/test/clients`
    /// * `query` - Query string parameters
    ///
    /// # Returns
    /// * `Err(AppError::NotFound)` - If Keycloak answers 404
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let body = self.get_raw(path, query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Makes a GET request and returns the raw body
    pub async fn get_raw(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, AppError> {
        let response = self
            .send_request(Method::GET, path, query, &RequestBody::Empty)
            .await?;
        Ok(response.body)
    }

    /// Makes a GET request, mapping 404 to `Ok(None)`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, AppError> {
        match self.get(path, query).await {
            Ok(value) => Ok(Some(value)),
            Err(AppError::NotFound(e)) => {
                debug!("{} not found: {}", path, e.status);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Makes a POST request with a JSON body
    ///
    /// Used both for creation, where [`ApiResponse::id`] yields the new ID from
    /// the `Location` header, and for action endpoints that answer with a body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, AppError> {
        let body = RequestBody::json(body)?;
        self.send_request(Method::POST, path, &[], &body).await
    }

    /// Makes a PUT request with a JSON body
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let body = RequestBody::json(body)?;
        self.send_request(Method::PUT, path, &[], &body).await?;
        Ok(())
    }

    /// Makes a PUT request with a `text/plain` body
    ///
    /// Needed by single-value endpoints such as realm localization texts.
    pub async fn put_plain(&self, path: &str, text: &str) -> Result<(), AppError> {
        self.send_request(Method::PUT, path, &[], &RequestBody::text(text))
            .await?;
        Ok(())
    }

    /// Makes a DELETE request without a body
    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.send_request(Method::DELETE, path, &[], &RequestBody::Empty)
            .await?;
        Ok(())
    }

    /// Makes a DELETE request with a JSON body, for bulk-delete endpoints
    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let body = RequestBody::json(body)?;
        self.send_request(Method::DELETE, path, &[], &body).await?;
        Ok(())
    }

    /// Performs one logical request against the admin API
    ///
    /// Logs in first when needed. If Keycloak answers 401 or 403 and the
    /// credential mode can be refreshed, the token is refreshed once and the
    /// request resent once; a second rejection is an
    /// [`AppError::Authentication`]. Other failures are returned as they are.
    pub async fn send_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: &RequestBody,
    ) -> Result<ApiResponse, AppError> {
        if path.trim_matches('/').is_empty() {
            return Err(AppError::InvalidInput(
                "admin API path must not be empty".to_string(),
            ));
        }
        let url = self.config.admin_url(path);
        let mut session = self.auth.session().await?;
        let mut attempt = 0;

        loop {
            let result = make_http_request(
                &self.http_client,
                method.clone(),
                &url,
                session.authorization.as_deref(),
                query,
                body,
            )
            .await;

            let rejected = match result {
                Err(AppError::TokenRejected(rejected)) => rejected,
                other => return other,
            };

            if attempt >= MAX_AUTH_RETRIES || !self.auth.supports_refresh() {
                error!(
                    "{} {} rejected with {} after {} refresh attempt(s)",
                    method, rejected.path, rejected.status, attempt
                );
                return Err(AppError::authentication(
                    Some(rejected.status),
                    rejected.to_string(),
                ));
            }

            warn!(
                "{} {} rejected with {}, refreshing token and retrying",
                method, rejected.path, rejected.status
            );
            session = self.auth.refresh(session.generation).await?;
            attempt += 1;
        }
    }

    /// Realm the credentials log in to
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.config.server.realm
    }

    /// Credential mode in use
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        self.auth.grant_type()
    }

    /// Snapshot of the current session state
    pub async fn credentials(&self) -> ClientCredentials {
        self.auth.credentials().await
    }

    /// Configuration the client was built from
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets a reference to the underlying Auth instance
    #[must_use]
    pub fn auth(&self) -> &Auth {
        &self.auth
    }
}

#[async_trait]
impl VersionGate for KeycloakClient {
    async fn version(&self) -> Result<ServerVersion, AppError> {
        self.auth.server_version().await
    }
}
