use actix_web::{http::Method, test, web, App};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use ledgerkeep::extractors::ApiCredentials;
use ledgerkeep::orchestrator::QueryOrchestrator;
use ledgerkeep::routes;
use ledgerkeep::store::MemoryLedgerStore;

const USERNAME: &str = "ledger";
const PASSWORD: &str = "test_password_for_integration_tests";

static AUTH_HEADER: Lazy<String> =
    Lazy::new(|| format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}"))));

/// One isolated in-memory ledger per test.
pub struct TestApp {
    orchestrator: web::Data<QueryOrchestrator>,
    credentials: web::Data<ApiCredentials>,
}

pub struct TestResponse {
    status: u16,
    total_count: Option<u64>,
    body: bytes::Bytes,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Parsed `x-total-count` header, if present.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub async fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryLedgerStore::new());
        let orchestrator = QueryOrchestrator::new(store, Duration::from_secs(5));
        let credentials = ApiCredentials::new(USERNAME, &Secret::new(PASSWORD.to_string()));

        TestApp {
            orchestrator: web::Data::new(orchestrator),
            credentials: web::Data::new(credentials),
        }
    }

    async fn send(&self, method: Method, path: &str, payload: Option<&Value>, auth: bool) -> TestResponse {
        let app = test::init_service(
            App::new()
                .app_data(self.orchestrator.clone())
                .app_data(self.credentials.clone())
                .configure(routes::configure),
        )
        .await;

        let mut req = test::TestRequest::default().method(method).uri(path);
        if auth {
            req = req.insert_header(("Authorization", AUTH_HEADER.as_str()));
        }
        if let Some(payload) = payload {
            req = req.set_json(payload);
        }
        let resp = test::call_service(&app, req.to_request()).await;

        let status = resp.status().as_u16();
        let total_count = resp
            .headers()
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = test::read_body(resp).await;

        TestResponse {
            status,
            total_count,
            body,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, true).await
    }

    pub async fn get_unauthenticated(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, false).await
    }

    pub async fn post(&self, path: &str, payload: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(payload), true).await
    }

    pub async fn patch(&self, path: &str, payload: &Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(payload), true).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None, true).await
    }

    /// Creates an account and asserts success.
    pub async fn create_account(&self, id: &str) {
        let response = self
            .post(
                "/api/accounts",
                &serde_json::json!({ "id": id, "name": format!("{id} account") }),
            )
            .await;
        assert_eq!(response.status(), 201, "account {id} not created");
    }

    /// Records a transaction and returns its id.
    pub async fn create_transaction(&self, payload: Value) -> String {
        let response = self.post("/api/transactions", &payload).await;
        assert_eq!(response.status(), 201, "transaction not created: {payload}");
        response.json().await["id"]
            .as_str()
            .expect("id in create response")
            .to_string()
    }
}
