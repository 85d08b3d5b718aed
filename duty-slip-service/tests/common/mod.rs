//! Test helper module for duty-slip-service integration tests.
//!
//! Runs the service on a random port against an in-process stub of the
//! upstream rate API.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use duty_slip_service::config::{DutyConfig, RateApiConfig};
use duty_slip_service::models::{CustomerRate, RateTitle};
use duty_slip_service::services::SettlementPolicy;
use duty_slip_service::startup::Application;
use rust_decimal::Decimal;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Shared state of the stub rate API.
#[derive(Clone, Default)]
pub struct StubRateApi {
    pub rates: Arc<Mutex<Vec<CustomerRate>>>,
    pub duty_slips: Arc<Mutex<Vec<Value>>>,
    /// When set, every write answers 500.
    pub fail_writes: Arc<AtomicBool>,
    next_id: Arc<AtomicU32>,
}

impl StubRateApi {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn refuse(&self) -> Option<Response> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Some((StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable").into_response())
        } else {
            None
        }
    }

    pub fn rates(&self) -> Vec<CustomerRate> {
        self.rates.lock().unwrap().clone()
    }

    pub fn duty_slips(&self) -> Vec<Value> {
        self.duty_slips.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

async fn list_rates(State(api): State<StubRateApi>) -> Json<Vec<CustomerRate>> {
    Json(api.rates())
}

async fn create_rate(State(api): State<StubRateApi>, Json(mut body): Json<Value>) -> Response {
    if let Some(refused) = api.refuse() {
        return refused;
    }

    body["_id"] = Value::String(api.next_id("rate"));
    match serde_json::from_value::<CustomerRate>(body) {
        Ok(record) => {
            api.rates.lock().unwrap().push(record.clone());
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn patch_rate(
    State(api): State<StubRateApi>,
    Path(id): Path<String>,
    Json(record): Json<CustomerRate>,
) -> Response {
    if let Some(refused) = api.refuse() {
        return refused;
    }

    let mut rates = api.rates.lock().unwrap();
    match rates.iter_mut().find(|r| r.id == id) {
        Some(existing) => {
            *existing = record.clone();
            Json(record).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_rate(State(api): State<StubRateApi>, Path(id): Path<String>) -> Response {
    if let Some(refused) = api.refuse() {
        return refused;
    }

    let mut rates = api.rates.lock().unwrap();
    let before = rates.len();
    rates.retain(|r| r.id != id);
    if rates.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn create_duty_slip(State(api): State<StubRateApi>, Json(mut body): Json<Value>) -> Response {
    if let Some(refused) = api.refuse() {
        return refused;
    }

    body["_id"] = Value::String(api.next_id("slip"));
    api.duty_slips.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_duty_slip(
    State(api): State<StubRateApi>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Some(refused) = api.refuse() {
        return refused;
    }

    body["_id"] = Value::String(id);
    api.duty_slips.lock().unwrap().push(body.clone());
    Json(body).into_response()
}

async fn spawn_stub(api: StubRateApi) -> String {
    let router = Router::new()
        .route("/api/customer-rate", get(list_rates).post(create_rate))
        .route("/api/customer-rate/:id", patch(patch_rate).delete(delete_rate))
        .route("/api/duty-slip", axum::routing::post(create_duty_slip))
        .route("/api/duty-slip/:id", patch(update_duty_slip))
        .with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub rate API");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://127.0.0.1:{}", port)
}

pub fn rate(
    id: &str,
    company: &str,
    customer: Option<&str>,
    title: &str,
    rate: i64,
    rate_per_km: Option<i64>,
) -> CustomerRate {
    CustomerRate {
        id: id.to_string(),
        company_name: company.to_string(),
        customer_name: customer.map(str::to_string),
        gst_no: "27ABCDE1234F1Z5".to_string(),
        mobile_number: "9876543210".to_string(),
        rate_per_km: rate_per_km.map(Decimal::from),
        title: RateTitle::from(title),
        rate: Some(Decimal::from(rate)),
    }
}

pub fn sample_catalog() -> Vec<CustomerRate> {
    vec![
        rate("r-acme-80", "Acme Travels", Some("Ravi Kumar"), "One Day / 80km", 2000, Some(12)),
        rate("r-acme-300", "Acme Travels", Some("Ravi Kumar"), "One Day / 300km", 4500, Some(11)),
        rate("r-blue-80", "Blue Line", Some("Meera Shah"), "One Day / 80km", 2200, Some(14)),
        rate("r-walkin", "Walk-in", None, "Local / 8hr / 80km", 1500, Some(10)),
        rate("r-zen", "Zen Corp", Some("Ravindra"), "Airport Transfer", 900, None),
    ]
}

/// Read a decimal the service serialized as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected a decimal string, got {}", value))
        .parse()
        .expect("Failed to parse decimal")
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub upstream: StubRateApi,
}

impl TestApp {
    /// Spawn the service against a stub rate API seeded with the sample catalog.
    pub async fn spawn() -> Self {
        Self::spawn_with_catalog(sample_catalog()).await
    }

    pub async fn spawn_with_catalog(catalog: Vec<CustomerRate>) -> Self {
        let upstream = StubRateApi::default();
        *upstream.rates.lock().unwrap() = catalog;
        let base_url = spawn_stub(upstream.clone()).await;

        Self::spawn_against(base_url, upstream).await
    }

    /// Spawn the service pointing at a rate API that is not listening.
    pub async fn spawn_without_upstream() -> Self {
        Self::spawn_against("http://127.0.0.1:1".to_string(), StubRateApi::default()).await
    }

    async fn spawn_against(base_url: String, upstream: StubRateApi) -> Self {
        let config = DutyConfig {
            common: CoreConfig { port: 0 }, // Random port
            service_name: "duty-slip-service-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            rate_api: RateApiConfig {
                base_url,
                timeout_secs: 5,
            },
            settlement: SettlementPolicy::default(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            upstream,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
