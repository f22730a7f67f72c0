use crate::common::*;
use keycloak_admin_client::prelude::*;
use mockito::{Matcher, Server};

#[tokio::test]
async fn client_credentials_login_reaches_version() {
    let mut server = Server::new_async().await;
    let (token, _) = mock_token_endpoint(&mut server, "client_credentials", false, 1).await;
    let info = mock_server_info(&mut server, "26.1.0").await;

    let client = KeycloakClient::new(client_credentials_config(&server.url()))
        .await
        .unwrap();

    assert_eq!(client.grant_type(), GrantType::ClientCredentials);
    assert_eq!(client.version().await.unwrap(), ServerVersion::V26_1);
    token.assert_async().await;
    info.assert_async().await;
}

#[tokio::test]
async fn password_login_reaches_version() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".to_string(), "password".to_string()),
            Matcher::UrlEncoded("client_id".to_string(), "terraform".to_string()),
            Matcher::UrlEncoded("username".to_string(), "admin".to_string()),
            Matcher::UrlEncoded("password".to_string(), "admin-password".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"pw-token","refresh_token":"pw-refresh","token_type":"Bearer","expires_in":60}"#)
        .expect(1)
        .create_async()
        .await;
    let info = server
        .mock("GET", SERVER_INFO_ENDPOINT)
        .match_header("authorization", "Bearer pw-token")
        .with_status(200)
        .with_body(r#"{"systemInfo":{"version":"25.0.6"}}"#)
        .create_async()
        .await;

    let client = KeycloakClient::new(password_config(&server.url()))
        .await
        .unwrap();

    assert_eq!(client.version().await.unwrap(), ServerVersion::new(25, 0, 6));
    let credentials = client.credentials().await;
    assert_eq!(credentials.grant_type, GrantType::Password);
    assert_eq!(credentials.access_token, "pw-token");
    assert_eq!(credentials.refresh_token, "pw-refresh");
    token.assert_async().await;
    info.assert_async().await;
}

#[tokio::test]
async fn static_token_login_reaches_version_without_token_endpoint() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", TOKEN_PATH)
        .expect(0)
        .create_async()
        .await;
    let info = server
        .mock("GET", SERVER_INFO_ENDPOINT)
        .match_header("authorization", "bearer static-token")
        .with_status(200)
        .with_body(r#"{"systemInfo":{"version":"24.0.5"}}"#)
        .create_async()
        .await;

    let client = KeycloakClient::new(static_token_config(&server.url()))
        .await
        .unwrap();

    assert_eq!(client.grant_type(), GrantType::StaticToken);
    assert_eq!(client.version().await.unwrap(), ServerVersion::new(24, 0, 5));
    token.assert_async().await;
    info.assert_async().await;
}

#[tokio::test]
async fn client_certificate_mode_reaches_version_without_bearer_token() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", TOKEN_PATH)
        .expect(0)
        .create_async()
        .await;
    let info = server
        .mock("GET", SERVER_INFO_ENDPOINT)
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"systemInfo":{"version":"26.2.0"}}"#)
        .create_async()
        .await;

    let client = KeycloakClient::new(mtls_config(&server.url()))
        .await
        .unwrap();

    assert_eq!(client.grant_type(), GrantType::None);
    assert_eq!(client.version().await.unwrap(), ServerVersion::V26_2);
    assert!(client.credentials().await.access_token.is_empty());
    token.assert_async().await;
    info.assert_async().await;
}

#[tokio::test]
async fn missing_credentials_fail_at_construction() {
    let server = Server::new_async().await;
    let result = KeycloakClient::new_lazy(base_config(&server.url()));
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[tokio::test]
async fn rejected_login_is_an_authentication_error() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", TOKEN_PATH)
        .with_status(401)
        .with_body(r#"{"error":"unauthorized_client","error_description":"Invalid client secret"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = KeycloakClient::new(client_credentials_config(&server.url()))
        .await
        .err()
        .expect("login should fail");

    match err {
        AppError::Authentication { status, message } => {
            assert_eq!(status, Some(StatusCode::UNAUTHORIZED));
            assert!(message.contains("Invalid client secret"));
        }
        other => panic!("Unexpected error: {other:?}"),
    }
    token.assert_async().await;
}

#[tokio::test]
async fn malformed_token_response_is_an_authentication_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", TOKEN_PATH)
        .with_status(200)
        .with_body("<html>proxy login</html>")
        .create_async()
        .await;

    let err = KeycloakClient::new(client_credentials_config(&server.url()))
        .await
        .err()
        .expect("login should fail");
    assert!(err.is_authentication());
}

#[tokio::test]
async fn lazy_client_logs_in_once_on_version_query() {
    let mut server = Server::new_async().await;
    let (token, issued) = mock_token_endpoint(&mut server, "client_credentials", false, 1).await;
    let info = server
        .mock("GET", SERVER_INFO_ENDPOINT)
        .with_status(200)
        .with_body(r#"{"systemInfo":{"version":"26.0.7"}}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = client_credentials_config(&server.url());
    config.server.initial_login = false;
    let client = KeycloakClient::new(config).await.unwrap();

    assert_eq!(issued.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(client.auth().cached_version().is_none());

    assert_eq!(client.version().await.unwrap(), ServerVersion::new(26, 0, 7));
    assert_eq!(client.version().await.unwrap(), ServerVersion::new(26, 0, 7));

    token.assert_async().await;
    info.assert_async().await;
}

#[tokio::test]
async fn refresh_replaces_the_whole_token_set() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::UrlEncoded("grant_type".to_string(), "password".to_string()))
        .with_status(200)
        .with_body(r#"{"access_token":"access-1","refresh_token":"refresh-1","token_type":"Bearer","expires_in":60}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".to_string(), "refresh_token".to_string()),
            Matcher::UrlEncoded("refresh_token".to_string(), "refresh-1".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"access-2","refresh_token":"refresh-2","token_type":"Bearer","expires_in":60}"#)
        .expect(1)
        .create_async()
        .await;
    mock_server_info(&mut server, "26.0.0").await;

    let client = KeycloakClient::new(password_config(&server.url()))
        .await
        .unwrap();
    let before = client.credentials().await;

    let session = client.auth().refresh(before.generation).await.unwrap();
    let after = client.credentials().await;

    assert_eq!(session.authorization.as_deref(), Some("Bearer access-2"));
    assert_ne!(before.access_token, after.access_token);
    assert_ne!(before.refresh_token, after.refresh_token);
    assert_eq!(before.token_type, after.token_type);
    assert_eq!(after.generation, before.generation + 1);
    login.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn expired_refresh_token_falls_back_to_login() {
    let mut server = Server::new_async().await;
    let (login, issued) = mock_token_endpoint(&mut server, "password", true, 2).await;
    let refresh = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::UrlEncoded("grant_type".to_string(), "refresh_token".to_string()))
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Token is not active"}"#)
        .expect(1)
        .create_async()
        .await;
    mock_server_info(&mut server, "26.0.0").await;

    let client = KeycloakClient::new(password_config(&server.url()))
        .await
        .unwrap();
    let generation = client.credentials().await.generation;

    client.auth().refresh(generation).await.unwrap();

    assert_eq!(issued.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(client.credentials().await.access_token, "token-2");
    login.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn stale_refresh_request_reuses_newer_token() {
    let mut server = Server::new_async().await;
    let (token, issued) = mock_token_endpoint(&mut server, "client_credentials", false, 2).await;
    mock_server_info(&mut server, "26.0.0").await;

    let client = KeycloakClient::new(client_credentials_config(&server.url()))
        .await
        .unwrap();
    let first = client.credentials().await.generation;

    client.auth().refresh(first).await.unwrap();
    let session = client.auth().refresh(first).await.unwrap();

    assert_eq!(session.authorization.as_deref(), Some("Bearer token-2"));
    assert_eq!(issued.load(std::sync::atomic::Ordering::SeqCst), 2);
    token.assert_async().await;
}

#[tokio::test]
async fn static_token_cannot_be_refreshed() {
    let mut server = Server::new_async().await;
    mock_server_info(&mut server, "26.0.0").await;

    let client = KeycloakClient::new(static_token_config(&server.url()))
        .await
        .unwrap();

    let err = client.auth().refresh(1).await.unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn legacy_base_path_is_used_for_token_and_admin_urls() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/auth/realms/master/protocol/openid-connect/token")
        .with_status(200)
        .with_body(r#"{"access_token":"legacy","token_type":"Bearer","expires_in":60}"#)
        .expect(1)
        .create_async()
        .await;
    let info = server
        .mock("GET", "/auth/admin/serverinfo")
        .with_status(200)
        .with_body(r#"{"systemInfo":{"version":"11.0.3.Final"}}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = client_credentials_config(&server.url());
    config.server.base_path = "/auth".to_string();
    let client = KeycloakClient::new(config).await.unwrap();

    assert_eq!(client.version().await.unwrap(), ServerVersion::new(11, 0, 3));
    token.assert_async().await;
    info.assert_async().await;
}
