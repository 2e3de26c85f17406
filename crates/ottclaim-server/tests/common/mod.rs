#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ottclaim_server::auth::password::hash_password;
use ottclaim_server::auth::{AdminCredentials, JwtManager};
use ottclaim_server::fulfillment::{FulfillmentOptions, FulfillmentService};
use ottclaim_server::http::{ApiSettings, AppState, build_router};
use ottclaim_server::notifications::Notifier;
use ottclaim_server::payment::PaymentClient;
use ottclaim_server::storage::{ClaimDatabase, NewClaim, OttStatus, PaymentStatus};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const JWT_SECRET: &[u8] = b"integration-test-secret";

fn admin_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASSWORD).unwrap())
        .clone()
}

pub struct TestApp {
    pub db: ClaimDatabase,
    pub router: Router,
}

pub struct TestAppBuilder {
    notifier: Notifier,
    payment: Option<PaymentClient>,
    auto_fulfill: bool,
    login_enabled: bool,
}

impl TestAppBuilder {
    pub fn notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn payment(mut self, payment: PaymentClient) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn auto_fulfill(mut self, on: bool) -> Self {
        self.auto_fulfill = on;
        self
    }

    pub fn without_login(mut self) -> Self {
        self.login_enabled = false;
        self
    }

    pub async fn build(self) -> TestApp {
        let db = ClaimDatabase::open_in_memory().await.unwrap();
        let fulfillment = Arc::new(FulfillmentService::new(
            db.clone(),
            self.notifier,
            FulfillmentOptions::default(),
        ));
        let password_hash = self.login_enabled.then(admin_hash);
        let state = AppState {
            db: db.clone(),
            fulfillment,
            payment: self.payment.map(Arc::new),
            jwt: Arc::new(JwtManager::new(JWT_SECRET, 3600)),
            admin: Arc::new(AdminCredentials::new(ADMIN_USER.to_string(), password_hash)),
            settings: Arc::new(ApiSettings {
                processing_fee: 4900,
                currency: "INR".to_string(),
                auto_fulfill_on_payment: self.auto_fulfill,
                batch_size: 25,
            }),
        };
        TestApp {
            db,
            router: build_router(state),
        }
    }
}

pub fn app() -> TestAppBuilder {
    TestAppBuilder {
        notifier: Notifier::disabled(),
        payment: None,
        auto_fulfill: true,
        login_enabled: true,
    }
}

pub fn admin_token() -> String {
    JwtManager::new(JWT_SECRET, 3600)
        .issue_admin_token(ADMIN_USER)
        .unwrap()
        .0
}

impl TestApp {
    /// Send a request and return (status, JSON body). An empty body reads as `Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None, None).await
    }

    pub async fn admin_get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(&admin_token()), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, None, Some(body)).await
    }

    pub async fn admin_post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send("POST", uri, Some(&admin_token()), body).await
    }

    /// A paid claim whose code maps to `product`, with one key for `platform`.
    pub async fn seed_paid_claim(&self, claim_id: &str, code: &str, product: &str, key: &str, platform: &str) {
        self.db
            .insert_sales_record(&format!("sr-{code}"), code, product)
            .await
            .unwrap();
        self.db
            .insert_ott_key(&format!("key-{key}"), key, platform)
            .await
            .unwrap();
        self.seed_claim(claim_id, code, Some("919876543210")).await;
        self.db
            .update_payment(claim_id, PaymentStatus::Paid, &format!("pay_{claim_id}"))
            .await
            .unwrap();
    }

    pub async fn seed_claim(&self, claim_id: &str, code: &str, phone: Option<&str>) {
        self.db
            .create_claim(&NewClaim {
                claim_id,
                name: "Kiran",
                email: "kiran@example.com",
                phone,
                activation_code: code,
                purchase_type: None,
                ott_status: OttStatus::Pending,
            })
            .await
            .unwrap();
    }
}
