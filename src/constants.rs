/// User agent string sent with every request unless overridden in the configuration
pub const USER_AGENT: &str = concat!("keycloak-admin-client/", env!("CARGO_PKG_VERSION"));
/// Default per-request timeout in seconds
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 15;
/// Realm used for logging in when none is configured
pub const DEFAULT_REALM: &str = "master";
/// Default Keycloak base URL
pub const DEFAULT_KEYCLOAK_URL: &str = "http://localhost:8080";
/// Path segment prepended to every admin API path
pub const ADMIN_API_PATH: &str = "/admin";
/// Path of the server info endpoint, relative to the admin root
pub const SERVER_INFO_PATH: &str = "/serverinfo";
/// Token type assumed when the token endpoint omits it, and for static tokens
pub const DEFAULT_TOKEN_TYPE: &str = "bearer";
/// Number of times a request is resent after its token was rejected
pub const MAX_AUTH_RETRIES: u32 = 1;
