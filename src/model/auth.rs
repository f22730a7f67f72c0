/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Credential modes and token state
//!
//! [`Grant`] is the configured way of obtaining a token. It is resolved once from
//! the configuration and never changes afterwards. [`TokenSet`] is what the token
//! endpoint handed back; it is replaced wholesale on every login or refresh.

use crate::application::config::{Credentials, TlsConfig};
use crate::constants::DEFAULT_TOKEN_TYPE;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of credential mode in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Resource-owner password grant
    Password,
    /// Client credentials grant
    ClientCredentials,
    /// Pre-issued access token supplied by the caller
    StaticToken,
    /// No token at all; the caller is identified by its TLS client certificate
    None,
}

impl GrantType {
    /// Value of the `grant_type` form field, or a descriptive name for the
    /// modes that never call the token endpoint
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::StaticToken => "static_token",
            GrantType::None => "none",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved credential mode together with the inputs it needs
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// Use this token as-is
    StaticToken {
        /// The bearer token
        access_token: String,
    },
    /// `grant_type=client_credentials`
    ClientCredentials {
        /// OAuth client ID
        client_id: String,
        /// OAuth client secret
        client_secret: String,
    },
    /// `grant_type=password`
    Password {
        /// OAuth client ID
        client_id: String,
        /// Secret for confidential clients
        client_secret: Option<String>,
        /// Account username
        username: String,
        /// Account password
        password: String,
    },
    /// Mutual TLS only, no bearer token
    ClientCertificate,
}

impl Grant {
    /// Picks the credential mode from the configured inputs
    ///
    /// Order: static access token, client credentials (secret without
    /// username/password), password grant, then mutual TLS when a client
    /// certificate is configured.
    pub fn resolve(credentials: &Credentials, tls: &TlsConfig) -> Result<Self, AppError> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let access_token = non_empty(&credentials.access_token);
        let client_secret = non_empty(&credentials.client_secret);
        let username = non_empty(&credentials.username);
        let password = non_empty(&credentials.password);
        let client_id = credentials.client_id.clone();

        if let Some(access_token) = access_token {
            return Ok(Grant::StaticToken { access_token });
        }

        match (client_secret, username, password) {
            (Some(client_secret), None, None) => {
                require_client_id(&client_id)?;
                Ok(Grant::ClientCredentials {
                    client_id,
                    client_secret,
                })
            }
            (client_secret, Some(username), Some(password)) => {
                require_client_id(&client_id)?;
                Ok(Grant::Password {
                    client_id,
                    client_secret,
                    username,
                    password,
                })
            }
            (None, None, None) if tls.has_client_identity() => Ok(Grant::ClientCertificate),
            _ => Err(AppError::Config(
                "must specify client id, username and password for password grant, or client id and secret for client credentials grant".to_string(),
            )),
        }
    }

    /// Kind of this grant
    #[must_use]
    pub fn kind(&self) -> GrantType {
        match self {
            Grant::StaticToken { .. } => GrantType::StaticToken,
            Grant::ClientCredentials { .. } => GrantType::ClientCredentials,
            Grant::Password { .. } => GrantType::Password,
            Grant::ClientCertificate => GrantType::None,
        }
    }

    /// Whether a rejected token can be replaced by logging in again
    #[must_use]
    pub fn supports_refresh(&self) -> bool {
        matches!(self, Grant::ClientCredentials { .. } | Grant::Password { .. })
    }

    /// Form fields posted to the token endpoint, `None` for modes that never call it
    #[must_use]
    pub fn login_form(&self) -> Option<Vec<(&'static str, String)>> {
        match self {
            Grant::ClientCredentials {
                client_id,
                client_secret,
            } => Some(vec![
                ("grant_type", GrantType::ClientCredentials.as_str().to_string()),
                ("client_id", client_id.clone()),
                ("client_secret", client_secret.clone()),
            ]),
            Grant::Password {
                client_id,
                client_secret,
                username,
                password,
            } => {
                let mut form = vec![
                    ("grant_type", GrantType::Password.as_str().to_string()),
                    ("client_id", client_id.clone()),
                    ("username", username.clone()),
                    ("password", password.clone()),
                ];
                if let Some(secret) = client_secret {
                    form.push(("client_secret", secret.clone()));
                }
                Some(form)
            }
            Grant::StaticToken { .. } | Grant::ClientCertificate => None,
        }
    }

    /// Form fields for a `refresh_token` grant using this grant's client identity
    #[must_use]
    pub fn refresh_form(&self, refresh_token: &str) -> Option<Vec<(&'static str, String)>> {
        let (client_id, client_secret) = match self {
            Grant::ClientCredentials {
                client_id,
                client_secret,
            } => (client_id, Some(client_secret)),
            Grant::Password {
                client_id,
                client_secret,
                ..
            } => (client_id, client_secret.as_ref()),
            Grant::StaticToken { .. } | Grant::ClientCertificate => return None,
        };
        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("client_id", client_id.clone()),
            ("refresh_token", refresh_token.to_string()),
        ];
        if let Some(secret) = client_secret {
            form.push(("client_secret", secret.clone()));
        }
        Some(form)
    }

    /// Token set for a static token; `None` for other modes
    #[must_use]
    pub fn static_tokens(&self) -> Option<TokenSet> {
        match self {
            Grant::StaticToken { access_token } => Some(TokenSet {
                access_token: access_token.clone(),
                refresh_token: None,
                token_type: DEFAULT_TOKEN_TYPE.to_string(),
                expires_in: 0,
                issued_at: Utc::now(),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grant::StaticToken { .. } => f.write_str("StaticToken"),
            Grant::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Grant::Password {
                client_id,
                username,
                ..
            } => f
                .debug_struct("Password")
                .field("client_id", client_id)
                .field("username", username)
                .finish_non_exhaustive(),
            Grant::ClientCertificate => f.write_str("ClientCertificate"),
        }
    }
}

fn require_client_id(client_id: &str) -> Result<(), AppError> {
    if client_id.is_empty() {
        return Err(AppError::Config("client id is required".to_string()));
    }
    Ok(())
}

/// Successful answer of the OpenID Connect token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for admin API calls
    pub access_token: String,
    /// Token for the `refresh_token` grant; Keycloak omits it for client credentials
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Usually `Bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: u64,
    /// Refresh token lifetime in seconds
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
}

/// Tokens currently held by the client
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
    /// Bearer token for admin API calls
    pub access_token: String,
    /// Token for the `refresh_token` grant, if any
    pub refresh_token: Option<String>,
    /// Authorization scheme reported by the token endpoint
    pub token_type: String,
    /// Lifetime reported by the token endpoint; informational only
    pub expires_in: u64,
    /// When the token endpoint answered
    pub issued_at: DateTime<Utc>,
}

impl TokenSet {
    /// `Authorization` header value
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            token_type: response
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_in: response.expires_in,
            issued_at: Utc::now(),
        }
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("token_type", &self.token_type)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish_non_exhaustive()
    }
}

/// Read-only view of the session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Credential mode in use
    pub grant_type: GrantType,
    /// Current access token, empty before the first login
    pub access_token: String,
    /// Current refresh token, empty when none is held
    pub refresh_token: String,
    /// Current token type, empty before the first login
    pub token_type: String,
    /// Lifetime reported with the current token
    pub expires_in: u64,
    /// Number of successful logins and refreshes so far
    pub generation: u64,
}

impl ClientCredentials {
    /// Builds a snapshot from the grant and the tokens currently held
    pub fn snapshot(grant: &Grant, tokens: Option<&TokenSet>, generation: u64) -> Self {
        Self {
            grant_type: grant.kind(),
            access_token: tokens.map(|t| t.access_token.clone()).unwrap_or_default(),
            refresh_token: tokens
                .and_then(|t| t.refresh_token.clone())
                .unwrap_or_default(),
            token_type: tokens.map(|t| t.token_type.clone()).unwrap_or_default(),
            expires_in: tokens.map(|t| t.expires_in).unwrap_or_default(),
            generation,
        }
    }
}
