/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # Keycloak Admin Client
//!
//! An authenticating client for the Keycloak Admin REST API.
//!
//! The client logs in with one of four credential modes (static token, client
//! credentials, password grant or mutual TLS), attaches the bearer token to every
//! request, and when Keycloak rejects the token it refreshes once and resends the
//! request once. Generic `get`/`post`/`put`/`delete` verbs cover the admin API;
//! resource-specific mapping is left to the caller.
//!
//! ```ignore
//! use keycloak_admin_client::prelude::*;
//!
//! let client = KeycloakClient::new(Config::new()).await?;
//! if client.supports(Capability::Organizations).await? {
//!     let created = client.post("/realms/test/organizations", &body).await?;
//!     println!("created {:?}", created.id());
//! }
//! ```

/// Application layer: configuration, authentication and the admin client
pub mod application;
/// Global constants
pub mod constants;
/// Error types
pub mod error;
/// Wire models and HTTP plumbing
pub mod model;
/// Commonly used re-exports
pub mod prelude;
/// Helper utilities
pub mod utils;

pub use application::config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
#[must_use]
pub fn version() -> &'static str {
    VERSION
}
