use assert_json_diff::assert_json_include;
use keycloak_admin_client::prelude::*;
use serde_json::json;

fn full_config() -> Config {
    Config {
        credentials: Credentials {
            client_id: "terraform".to_string(),
            client_secret: Some("client-secret".to_string()),
            username: Some("admin".to_string()),
            password: Some("admin-password".to_string()),
            access_token: Some("static-token".to_string()),
        },
        server: ServerConfig {
            url: "https://sso.example.com".to_string(),
            realm: "master".to_string(),
            ..ServerConfig::default()
        },
        tls: TlsConfig {
            client_cert: Some("cert".to_string()),
            client_key: Some("key".to_string()),
            ..TlsConfig::default()
        },
    }
}

#[test]
fn test_serialized_config_omits_secrets() {
    let value = serde_json::to_value(full_config()).unwrap();

    assert_json_include!(
        actual: value.clone(),
        expected: json!({
            "credentials": { "client_id": "terraform", "username": "admin" },
            "server": { "url": "https://sso.example.com", "realm": "master", "timeout": 15 },
            "tls": { "client_cert": "cert" }
        })
    );

    let text = value.to_string();
    for secret in ["client-secret", "admin-password", "static-token", "\"key\""] {
        assert!(!text.contains(secret), "{secret} leaked into {text}");
    }
}

#[test]
fn test_display_does_not_leak_secrets() {
    let printed = format!("{} {:?}", full_config(), full_config());
    assert!(!printed.contains("client-secret"));
    assert!(!printed.contains("admin-password"));
}

#[test]
fn test_server_config_defaults() {
    let server = ServerConfig::default();
    assert_eq!(server.realm, "master");
    assert_eq!(server.timeout, DEFAULT_CLIENT_TIMEOUT_SECS);
    assert!(server.initial_login);
    assert!(server.admin_url.is_none());
}

#[test]
fn test_user_agent_override() {
    let mut config = full_config();
    assert_eq!(config.user_agent(), USER_AGENT);
    config.server.user_agent = Some("terraform-provider-keycloak/5.0".to_string());
    assert_eq!(config.user_agent(), "terraform-provider-keycloak/5.0");
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: Config = serde_json::from_value(json!({
        "credentials": { "client_id": "terraform", "client_secret": "s" },
        "server": { "url": "http://kc", "realm": "ops", "timeout": 30, "initial_login": false }
    }))
    .unwrap();

    assert_eq!(config.credentials.client_secret.as_deref(), Some("s"));
    assert_eq!(config.server.base_path, "");
    assert!(config.tls.ca_cert.is_none());
    assert_eq!(
        config.token_url(),
        "http://kc/realms/ops/protocol/openid-connect/token"
    );
}
