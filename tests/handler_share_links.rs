mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{ADMIN_TOKEN, BASE_URL, TestApp};
use serde_json::{Value, json};

async fn create_link(server: &TestServer, name: &str) -> Value {
    let response = server
        .post("/api/share-links")
        .authorization_bearer(ADMIN_TOKEN)
        .json(&json!({ "name": name, "title": "Find me" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_create_share_link() {
    let app = TestApp::new().await;
    let server = app.server();
    app.set_time(1234);

    let link = create_link(&server, "Weekend trip").await;

    let id = link["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert_eq!(link["name"], "Weekend trip");
    assert_eq!(link["title"], "Find me");
    assert_eq!(link["url"], format!("/track?id={}", id));
    assert!(link["short_url"].is_null());
    assert_eq!(link["created_at"], 1234);
}

#[tokio::test]
async fn test_create_validates_body() {
    let app = TestApp::new().await;
    let server = app.server();

    let response = server
        .post("/api/share-links")
        .authorization_bearer(ADMIN_TOKEN)
        .json(&json!({ "name": "", "expiration_date": "31/12/2030" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = TestApp::new().await;
    let server = app.server();

    server
        .post("/api/share-links")
        .json(&json!({ "name": "Trip" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_get_update_delete() {
    let app = TestApp::new().await;
    let server = app.server();

    app.set_time(1000);
    let first = create_link(&server, "First").await;
    app.set_time(2000);
    create_link(&server, "Second").await;

    let list = server
        .get("/api/share-links")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .json::<Value>();
    assert_eq!(list["total"], 2);
    assert_eq!(list["items"][0]["name"], "Second");

    let id = first["id"].as_str().unwrap();

    let fetched = server
        .get(&format!("/api/share-links/{}", id))
        .authorization_bearer(ADMIN_TOKEN)
        .await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["name"], "First");

    app.set_time(3000);
    let updated = server
        .patch(&format!("/api/share-links/{}", id))
        .authorization_bearer(ADMIN_TOKEN)
        .json(&json!({ "description": "Updated", "expiration_date": "2030-12-31" }))
        .await;
    updated.assert_status_ok();
    let json = updated.json::<Value>();
    assert_eq!(json["name"], "First");
    assert_eq!(json["description"], "Updated");
    assert_eq!(json["expiration_date"], "2030-12-31");
    assert_eq!(json["created_at"], 1000);
    assert_eq!(json["updated_at"], 3000);

    server
        .delete(&format!("/api/share-links/{}", id))
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/share-links/{}", id))
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_short_url_is_issued_once() {
    let app = TestApp::new().await;
    let server = app.server();
    let link = create_link(&server, "Trip").await;
    let id = link["id"].as_str().unwrap();

    let first = server
        .post(&format!("/api/share-links/{}/short-url", id))
        .authorization_bearer(ADMIN_TOKEN)
        .await;
    first.assert_status_ok();
    let first = first.json::<Value>();

    let code = first["short_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(
        code.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    );
    assert_eq!(first["short_url"], format!("{}/s/{}", BASE_URL, code));

    let second = server
        .post(&format!("/api/share-links/{}/short-url", id))
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .json::<Value>();
    assert_eq!(second["short_code"], code.as_str());
    assert_eq!(second["short_url"], first["short_url"]);
}

#[tokio::test]
async fn test_short_url_for_missing_link() {
    let app = TestApp::new().await;
    let server = app.server();

    server
        .post("/api/share-links/missing/short-url")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_locations_of_share_link() {
    let app = TestApp::new().await;
    let server = app.server();
    let link = create_link(&server, "Trip").await;
    let id = link["id"].as_str().unwrap();

    for device in ["device-a", "device-b"] {
        server
            .post("/track/fix")
            .json(&json!({
                "device_id": device,
                "share_link_id": id,
                "latitude": 1.0,
                "longitude": 2.0
            }))
            .await
            .assert_status_ok();
    }
    server
        .post("/track/fix")
        .json(&json!({ "device_id": "device-c", "latitude": 1.0, "longitude": 2.0 }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/api/share-links/{}/locations", id))
        .authorization_bearer(ADMIN_TOKEN)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["share_link_id"], id);
    assert_eq!(json["total"], 2);

    let mut devices: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["device_id"].as_str().unwrap())
        .collect();
    devices.sort();
    assert_eq!(devices, ["device-a", "device-b"]);
}
