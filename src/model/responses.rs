/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/
use pretty_simple_display::{DebugPretty, DisplaySimple};
use serde::{Deserialize, Serialize};

/// Subset of `GET /admin/serverinfo` used for version discovery
#[derive(DebugPretty, DisplaySimple, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfoResponse {
    /// System section of the server info
    #[serde(default)]
    pub system_info: SystemInfo,
}

/// System section of the server info
#[derive(DebugPretty, DisplaySimple, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// Release string, e.g. `26.1.4`
    #[serde(default)]
    pub version: String,
    /// Server clock as reported by the server
    #[serde(default)]
    pub server_time: Option<String>,
    /// Uptime as reported by the server
    #[serde(default)]
    pub uptime: Option<String>,
}
