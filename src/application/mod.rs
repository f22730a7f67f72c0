/// Session state: login, refresh and version discovery
pub mod auth;
/// Admin API client
pub mod client;
/// Application configuration module
pub mod config;
/// Server version parsing and version-gated capabilities
pub mod version;
