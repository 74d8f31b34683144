#![allow(dead_code)]

use invoice_crm_service::config::{CrmConfig, DeploymentMode};
use invoice_crm_service::services::MemoryStore;
use invoice_crm_service::startup::Application;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub api: String,
    pub port: u16,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn on a random port with an isolated memory store.
    pub async fn spawn_with(customize: impl FnOnce(&mut CrmConfig)) -> Self {
        let mut config = CrmConfig::in_memory();
        config.mode = DeploymentMode::Server;
        config.common.port = 0; // Random port for testing
        customize(&mut config);
        let prefix = config.http.api_prefix.clone();

        let store = Arc::new(MemoryStore::new());
        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port().expect("server mode binds a port");
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            api: format!("{}{}", address, prefix),
            address,
            port,
            store,
            client,
        }
    }

    pub async fn post_company(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/companies", self.api))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a company and return its id, asserting success.
    pub async fn create_company(&self, name: &str) -> String {
        let response = self.post_company(json!({ "name": name })).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["_id"].as_str().expect("company id").to_string()
    }

    pub async fn list_companies(&self) -> Vec<Value> {
        let response = self
            .client
            .get(format!("{}/companies", self.api))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse JSON")
    }

    pub async fn post_invoice(&self, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/invoices", self.api))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.api, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
