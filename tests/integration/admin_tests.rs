use crate::common;
use keycloak_admin_client::prelude::*;
use serde_json::json;
use tracing::info;

#[tokio::test]
#[ignore]
async fn test_realm_lifecycle() {
    let client = common::create_test_client().await;
    let name = common::unique_name("it-realm");

    let created = client
        .post("/realms", &json!({"realm": name, "enabled": true}))
        .await
        .expect("Failed to create realm");
    assert_eq!(created.status, StatusCode::CREATED);

    let duplicate = client
        .post("/realms", &json!({"realm": name, "enabled": true}))
        .await
        .unwrap_err();
    assert!(error_is_409(&duplicate));

    client
        .put(&format!("/realms/{name}"), &json!({"displayName": "Integration"}))
        .await
        .expect("Failed to update realm");

    let realm: serde_json::Value = client
        .get(&format!("/realms/{name}"), &[])
        .await
        .expect("Failed to read realm");
    assert_eq!(realm["displayName"], "Integration");

    client
        .delete(&format!("/realms/{name}"))
        .await
        .expect("Failed to delete realm");

    let gone: Option<serde_json::Value> = client
        .get_optional(&format!("/realms/{name}"), &[])
        .await
        .expect("Lookup after delete failed");
    assert!(gone.is_none());
}

#[tokio::test]
#[ignore]
async fn test_created_group_id_from_location() {
    let client = common::create_test_client().await;
    let realm = client.realm().to_string();
    let name = common::unique_name("it-group");

    let created = client
        .post(&format!("/realms/{realm}/groups"), &json!({"name": name}))
        .await
        .expect("Failed to create group");
    let id = created.id().expect("Location header should carry the group id");
    info!("Created group {} with id {}", name, id);

    let group: serde_json::Value = client
        .get(&format!("/realms/{realm}/groups/{id}"), &[])
        .await
        .expect("Failed to read group");
    assert_eq!(group["name"], name.as_str());

    client
        .delete(&format!("/realms/{realm}/groups/{id}"))
        .await
        .expect("Failed to delete group");
}

#[tokio::test]
#[ignore]
async fn test_organizations_gated_by_version() {
    let client = common::create_test_client().await;
    if !client
        .supports(Capability::Organizations)
        .await
        .expect("Failed to get version")
    {
        info!("Organizations are not available on this server");
        return;
    }

    let realm = client.realm().to_string();
    let result = client
        .get::<serde_json::Value>(
            &format!("/realms/{realm}/organizations"),
            &[("first", "0"), ("max", "1")],
        )
        .await;
    if let Err(e) = result {
        assert!(!e.is_authentication(), "unexpected authentication failure: {e}");
    }
}
