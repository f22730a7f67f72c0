/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # Keycloak Admin Client Prelude
//!
//! Brings the commonly used types and traits into scope.
//!
//! ## Usage
//!
//! ```rust
//! use keycloak_admin_client::prelude::*;
//!
//! let version = ServerVersion::parse("26.1.0").unwrap();
//! assert!(Capability::Organizations.is_supported_by(version));
//! ```

// ============================================================================
// CORE CONFIGURATION AND SETUP
// ============================================================================

/// Configuration for the Keycloak admin client
pub use crate::config::{Config, Credentials, ServerConfig, TlsConfig};

/// Library version information
pub use crate::{VERSION, version};

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error types and classification helpers
pub use crate::error::{ApiError, AppError, error_is_404, error_is_409};

// ============================================================================
// AUTHENTICATION AND CLIENT
// ============================================================================

/// Session state manager
pub use crate::application::auth::{Auth, Session};

/// Admin API client
pub use crate::application::client::KeycloakClient;

/// Credential modes and token state
pub use crate::model::auth::{ClientCredentials, Grant, GrantType, TokenSet};

// ============================================================================
// VERSION GATE
// ============================================================================

/// Server version and capability queries
pub use crate::application::version::{Capability, ServerVersion, VersionGate};

// ============================================================================
// TRANSPORT
// ============================================================================

/// Request bodies and responses
pub use crate::model::http::{ApiResponse, RequestBody};

// ============================================================================
// UTILITIES
// ============================================================================

/// Location header parsing
pub use crate::utils::id::id_from_location;

/// Logging utilities
pub use crate::utils::logger::setup_logger;

/// Global constants
pub use crate::constants::*;

// ============================================================================
// RE-EXPORTS FROM EXTERNAL CRATES
// ============================================================================

/// Re-export commonly used external types
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
pub use tokio;
pub use tracing::{debug, error, info, warn};

/// Re-export reqwest types that appear in the public API
pub use reqwest::{Method, StatusCode};
