// Common utilities for integration tests

use keycloak_admin_client::prelude::*;
use tracing::info;

/// Creates a client from the environment and logs in
pub async fn create_test_client() -> KeycloakClient {
    setup_logger();
    let config = Config::new();
    info!("Connecting to {} as {}", config.server.url, config.credentials.client_id);

    KeycloakClient::new(config)
        .await
        .expect("Failed to log in to Keycloak")
}

/// Unique name for resources created by a test run
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, chrono::Utc::now().timestamp_millis())
}
