/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Keycloak server version and version-gated capabilities

use crate::error::AppError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static VERSION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*v?(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("version regex is valid")
});

/// Release number of a Keycloak server
///
/// Only the numeric `major.minor.patch` prefix takes part in comparisons; build
/// qualifiers such as `.Final`, `-SNAPSHOT` or `.redhat-00001` are kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    /// Major release
    pub major: u64,
    /// Minor release
    pub minor: u64,
    /// Patch release
    pub patch: u64,
}

impl ServerVersion {
    pub const V6: ServerVersion = ServerVersion::new(6, 0, 0);
    pub const V7: ServerVersion = ServerVersion::new(7, 0, 0);
    pub const V8: ServerVersion = ServerVersion::new(8, 0, 0);
    pub const V9: ServerVersion = ServerVersion::new(9, 0, 0);
    pub const V10: ServerVersion = ServerVersion::new(10, 0, 0);
    pub const V11: ServerVersion = ServerVersion::new(11, 0, 0);
    pub const V12: ServerVersion = ServerVersion::new(12, 0, 0);
    pub const V13: ServerVersion = ServerVersion::new(13, 0, 0);
    pub const V14: ServerVersion = ServerVersion::new(14, 0, 0);
    pub const V15: ServerVersion = ServerVersion::new(15, 0, 0);
    pub const V16: ServerVersion = ServerVersion::new(16, 0, 0);
    pub const V17: ServerVersion = ServerVersion::new(17, 0, 0);
    pub const V18: ServerVersion = ServerVersion::new(18, 0, 0);
    pub const V19: ServerVersion = ServerVersion::new(19, 0, 0);
    pub const V20: ServerVersion = ServerVersion::new(20, 0, 0);
    pub const V21: ServerVersion = ServerVersion::new(21, 0, 0);
    pub const V22: ServerVersion = ServerVersion::new(22, 0, 0);
    pub const V23: ServerVersion = ServerVersion::new(23, 0, 0);
    pub const V24: ServerVersion = ServerVersion::new(24, 0, 0);
    pub const V25: ServerVersion = ServerVersion::new(25, 0, 0);
    pub const V26: ServerVersion = ServerVersion::new(26, 0, 0);
    pub const V26_1: ServerVersion = ServerVersion::new(26, 1, 0);
    pub const V26_2: ServerVersion = ServerVersion::new(26, 2, 0);
    pub const V26_3: ServerVersion = ServerVersion::new(26, 3, 0);

    /// Stand-in for builds that report no release number (`nightly`, `999-SNAPSHOT`)
    pub const LATEST: ServerVersion = ServerVersion::new(u64::MAX, 0, 0);

    /// Creates a version from its parts
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a version as reported by `/admin/serverinfo`
    ///
    /// A string without a leading number is a development build and compares
    /// newer than any release. `999.x` snapshot builds are treated the same way.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Version("server reported an empty version".to_string()));
        }

        let Some(captures) = VERSION_PREFIX.captures(trimmed) else {
            return Ok(ServerVersion::LATEST);
        };

        let part = |index: usize| -> Result<u64, AppError> {
            captures
                .get(index)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map(|v| v.unwrap_or(0))
                .map_err(|e| AppError::Version(format!("invalid version {trimmed}: {e}")))
        };

        let version = ServerVersion::new(part(1)?, part(2)?, part(3)?);
        if version.major == 999 {
            return Ok(ServerVersion::LATEST);
        }
        Ok(version)
    }
}

impl FromStr for ServerVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServerVersion::parse(s)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ServerVersion::LATEST {
            return f.write_str("latest");
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Admin API features whose presence depends on the server release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Authentication executions and sub-flows expose a `priority`
    ExecutionPriority,
    /// The `oidc-sub-mapper` protocol mapper exists
    SubProtocolMapper,
    /// Realm organizations endpoints exist
    Organizations,
}

impl Capability {
    /// First release that ships the capability
    #[must_use]
    pub fn minimum_version(&self) -> ServerVersion {
        match self {
            Capability::ExecutionPriority | Capability::SubProtocolMapper => ServerVersion::V25,
            Capability::Organizations => ServerVersion::V26,
        }
    }

    /// Whether `version` ships the capability
    #[must_use]
    pub fn is_supported_by(&self, version: ServerVersion) -> bool {
        version >= self.minimum_version()
    }
}

/// Version queries resource mappers branch on
///
/// Implementors only provide [`VersionGate::version`]; comparisons and capability
/// checks are derived from it.
#[async_trait]
pub trait VersionGate: Send + Sync {
    /// Server version, resolved once and cached
    async fn version(&self) -> Result<ServerVersion, AppError>;

    /// `server >= threshold`
    async fn version_is_greater_than_or_equal_to(
        &self,
        threshold: ServerVersion,
    ) -> Result<bool, AppError> {
        Ok(self.version().await? >= threshold)
    }

    /// `server < threshold`
    async fn version_is_less_than(&self, threshold: ServerVersion) -> Result<bool, AppError> {
        Ok(self.version().await? < threshold)
    }

    /// `server <= threshold`
    async fn version_is_less_than_or_equal_to(
        &self,
        threshold: ServerVersion,
    ) -> Result<bool, AppError> {
        Ok(self.version().await? <= threshold)
    }

    /// Whether the server ships `capability`
    async fn supports(&self, capability: Capability) -> Result<bool, AppError> {
        Ok(capability.is_supported_by(self.version().await?))
    }
}
