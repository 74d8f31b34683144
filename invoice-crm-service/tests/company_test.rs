//! Company endpoint integration tests.

mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn created_company_is_listed_exactly_once() {
    let app = TestApp::spawn().await;

    let id = app.create_company("Acme Traders").await;
    let companies = app.list_companies().await;

    let matching: Vec<&Value> = companies
        .iter()
        .filter(|c| c["name"] == "Acme Traders")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["_id"], id.as_str());
}

#[tokio::test]
async fn create_company_returns_created_record() {
    let app = TestApp::spawn().await;

    let response = app.post_company(json!({ "name": "Globex" })).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Globex");
    assert_eq!(body["_id"].as_str().unwrap().len(), 24);
}

#[tokio::test]
async fn duplicate_company_name_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_company("Initech").await;

    let response = app.post_company(json!({ "name": "Initech" })).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Company validation failed: name 'Initech' already exists"
    );
    assert_eq!(app.list_companies().await.len(), 1);
}

#[tokio::test]
async fn missing_name_is_rejected_and_nothing_persisted() {
    let app = TestApp::spawn().await;
    app.create_company("Existing").await;
    let before = app.list_companies().await.len();

    let response = app.post_company(json!({})).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("name is required"));
    assert_eq!(app.list_companies().await.len(), before);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/companies", app.api))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.store.company_count().await, 0);
}

#[tokio::test]
async fn get_company_by_id() {
    let app = TestApp::spawn().await;
    let id = app.create_company("Umbrella").await;

    let response = app.get(&format!("/companies/{}", id)).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "_id": id, "name": "Umbrella" }));
}

#[tokio::test]
async fn unknown_company_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.get("/companies/65a1f0c2e4b0a1b2c3d4e5f6").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Company not found");
}

#[tokio::test]
async fn malformed_company_id_is_a_server_error() {
    let app = TestApp::spawn().await;

    let response = app.get("/companies/not-an-object-id").await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Server Error");
}

#[tokio::test]
async fn store_outage_is_a_server_error() {
    let app = TestApp::spawn().await;
    app.store.set_unavailable(true);

    let response = app.get("/companies").await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Server Error");
}

#[tokio::test]
async fn ill_typed_name_reports_expected_shape() {
    let app = TestApp::spawn().await;

    let response = app.post_company(json!({ "name": true })).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("expected a string or number"), "{}", message);
    assert!(!message.contains("Scalar"));
    assert!(app.list_companies().await.is_empty());
}
