/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/
use crate::constants::{
    ADMIN_API_PATH, DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_KEYCLOAK_URL, DEFAULT_REALM,
    SERVER_INFO_PATH, USER_AGENT,
};
use crate::utils::config::{get_env_map, get_env_or_default, get_env_or_none};
use dotenv::dotenv;
use pretty_simple_display::{DebugPretty, DisplaySimple};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, Default)]
/// Credentials used to obtain an admin token
///
/// Secrets are never serialized, so printing a configuration does not leak them.
pub struct Credentials {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret, absent for public clients
    #[serde(skip_serializing, default)]
    pub client_secret: Option<String>,
    /// Username for the resource-owner password grant
    #[serde(default)]
    pub username: Option<String>,
    /// Password for the resource-owner password grant
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    /// Pre-issued access token; never refreshed
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,
}

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone)]
/// Location of the Keycloak server and request settings
pub struct ServerConfig {
    /// Keycloak root URL, e.g. `https://sso.example.com`
    pub url: String,
    /// Context path in front of `/realms` and `/admin` (`/auth` on legacy servers)
    #[serde(default)]
    pub base_path: String,
    /// Separate root for the admin API, when it is exposed elsewhere
    #[serde(default)]
    pub admin_url: Option<String>,
    /// Realm the credentials belong to
    pub realm: String,
    /// Per-request timeout in seconds, 0 for none
    pub timeout: u64,
    /// Overrides the default user agent
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Log in while constructing the client instead of on the first request
    pub initial_login: bool,
    /// Headers attached to every outgoing request
    #[serde(default)]
    pub additional_headers: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_KEYCLOAK_URL.to_string(),
            base_path: String::new(),
            admin_url: None,
            realm: DEFAULT_REALM.to_string(),
            timeout: DEFAULT_CLIENT_TIMEOUT_SECS,
            user_agent: None,
            initial_login: true,
            additional_headers: HashMap::new(),
        }
    }
}

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, Default)]
/// TLS settings for the transport
pub struct TlsConfig {
    /// PEM encoded CA certificate(s) added to the system trust store
    #[serde(default)]
    pub ca_cert: Option<String>,
    /// PEM encoded client certificate for mutual TLS
    #[serde(default)]
    pub client_cert: Option<String>,
    /// PEM encoded PKCS#8 private key matching `client_cert`
    #[serde(skip_serializing, default)]
    pub client_key: Option<String>,
    /// Accept invalid server certificates
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    /// Whether a client certificate and key are both configured
    #[must_use]
    pub fn has_client_identity(&self) -> bool {
        self.client_cert.as_deref().is_some_and(|c| !c.is_empty())
            && self.client_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone)]
/// Main configuration for the Keycloak admin client
pub struct Config {
    /// Authentication credentials
    pub credentials: Credentials,
    /// Server location and request settings
    pub server: ServerConfig,
    /// Transport security settings
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates a configuration from `KEYCLOAK_*` environment variables
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn new() -> Self {
        match dotenv() {
            Ok(_) => debug!("Successfully loaded .env file"),
            Err(e) => debug!("Failed to load .env file: {e}"),
        }

        let url = get_env_or_default("KEYCLOAK_URL", String::from(DEFAULT_KEYCLOAK_URL));
        let client_id = get_env_or_default("KEYCLOAK_CLIENT_ID", String::new());
        let access_token: Option<String> = get_env_or_none("KEYCLOAK_ACCESS_TOKEN");

        if client_id.is_empty() && access_token.is_none() {
            error!("KEYCLOAK_CLIENT_ID not found in environment variables or .env file");
        }

        Config {
            credentials: Credentials {
                client_id,
                client_secret: get_env_or_none("KEYCLOAK_CLIENT_SECRET"),
                username: get_env_or_none("KEYCLOAK_USER"),
                password: get_env_or_none("KEYCLOAK_PASSWORD"),
                access_token,
            },
            server: ServerConfig {
                url,
                base_path: get_env_or_default("KEYCLOAK_BASE_PATH", String::new()),
                admin_url: get_env_or_none("KEYCLOAK_ADMIN_URL"),
                realm: get_env_or_default("KEYCLOAK_REALM", String::from(DEFAULT_REALM)),
                timeout: get_env_or_default(
                    "KEYCLOAK_CLIENT_TIMEOUT",
                    DEFAULT_CLIENT_TIMEOUT_SECS,
                ),
                user_agent: get_env_or_none("KEYCLOAK_USER_AGENT"),
                initial_login: get_env_or_default("KEYCLOAK_INITIAL_LOGIN", true),
                additional_headers: get_env_map("KEYCLOAK_ADDITIONAL_HEADERS"),
            },
            tls: TlsConfig {
                ca_cert: get_env_or_none("KEYCLOAK_TLS_CA_CERT"),
                client_cert: get_env_or_none("KEYCLOAK_TLS_CLIENT_CERT"),
                client_key: get_env_or_none("KEYCLOAK_TLS_CLIENT_KEY"),
                insecure_skip_verify: get_env_or_default(
                    "KEYCLOAK_TLS_INSECURE_SKIP_VERIFY",
                    false,
                ),
            },
        }
    }

    /// Root for realm endpoints: `{url}{base_path}`
    #[must_use]
    pub fn auth_root(&self) -> String {
        format!(
            "{}{}",
            self.server.url.trim_end_matches('/'),
            normalize_path(&self.server.base_path)
        )
    }

    /// OpenID Connect token endpoint of the login realm
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.auth_root(),
            self.server.realm
        )
    }

    /// Root of the admin API, honoring `admin_url` when set
    #[must_use]
    pub fn admin_root(&self) -> String {
        let root = match self.server.admin_url.as_deref() {
            Some(admin) if !admin.is_empty() => admin.trim_end_matches('/').to_string(),
            _ => self.auth_root(),
        };
        format!("{root}{ADMIN_API_PATH}")
    }

    /// Full URL of an admin API path such as `/realms/foo/clients`
    #[must_use]
    pub fn admin_url(&self, path: &str) -> String {
        format!("{}{}", self.admin_root(), normalize_path(path))
    }

    /// Server info endpoint used for version discovery
    #[must_use]
    pub fn server_info_url(&self) -> String {
        format!("{}{}", self.admin_root(), SERVER_INFO_PATH)
    }

    /// Per-request timeout; `None` when `timeout` is 0, which disables the deadline
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.server.timeout > 0).then(|| Duration::from_secs(self.server.timeout))
    }

    /// User agent sent with every request
    #[must_use]
    pub fn user_agent(&self) -> &str {
        match self.server.user_agent.as_deref() {
            Some(agent) if !agent.is_empty() => agent,
            _ => USER_AGENT,
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
