//! HTTP client for the upstream rate API that stores customer rates and
//! duty slips.

use crate::config::RateApiConfig;
use crate::error::{DutyError, DutyResult};
use crate::models::{CustomerRate, DutySlip, NewCustomerRate};
use crate::services::metrics::record_upstream_error;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::time::Duration;

const CUSTOMER_RATE_PATH: &str = "/api/customer-rate";
const DUTY_SLIP_PATH: &str = "/api/duty-slip";

#[derive(Debug, Clone)]
pub struct RateClient {
    client: Client,
    base_url: String,
}

impl RateClient {
    pub fn new(settings: &RateApiConfig) -> DutyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DutyError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the full customer rate catalog.
    #[tracing::instrument(skip(self))]
    pub async fn list_rates(&self, request_id: Option<&str>) -> DutyResult<Vec<CustomerRate>> {
        let result = async {
            let response = self
                .client
                .traced_get(&self.url(CUSTOMER_RATE_PATH))
                .send(request_id)
                .await
                .map_err(network_failure)?;
            decode(accept(response).await?).await
        }
        .await;

        observe("list_rates", result)
    }

    #[tracing::instrument(skip(self, rate), fields(company_name = %rate.company_name))]
    pub async fn create_rate(
        &self,
        rate: &NewCustomerRate,
        request_id: Option<&str>,
    ) -> DutyResult<CustomerRate> {
        let result = async {
            let response = self
                .client
                .traced_post(&self.url(CUSTOMER_RATE_PATH))
                .json(rate)
                .send(request_id)
                .await
                .map_err(network_failure)?;
            decode(accept(response).await?).await
        }
        .await;

        observe("create_rate", result)
    }

    /// Persist an edited record in full.
    #[tracing::instrument(skip(self, rate), fields(rate_id = %rate.id))]
    pub async fn patch_rate(&self, rate: &CustomerRate, request_id: Option<&str>) -> DutyResult<()> {
        let url = self.url(&format!("{}/{}", CUSTOMER_RATE_PATH, rate.id));
        let result = async {
            let response = self
                .client
                .traced_patch(&url)
                .json(rate)
                .send(request_id)
                .await
                .map_err(network_failure)?;
            accept(response).await.map(|_| ())
        }
        .await;

        observe("patch_rate", result)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_rate(&self, id: &str, request_id: Option<&str>) -> DutyResult<()> {
        let url = self.url(&format!("{}/{}", CUSTOMER_RATE_PATH, id));
        let result = async {
            let response = self
                .client
                .traced_delete(&url)
                .send(request_id)
                .await
                .map_err(network_failure)?;
            accept(response).await.map(|_| ())
        }
        .await;

        observe("delete_rate", result)
    }

    /// Store a settled slip; returns whatever the API echoed back.
    #[tracing::instrument(skip(self, slip), fields(duty_slip_no = %slip.draft.duty_slip_no))]
    pub async fn create_duty_slip(
        &self,
        slip: &DutySlip,
        request_id: Option<&str>,
    ) -> DutyResult<Value> {
        let result = async {
            let response = self
                .client
                .traced_post(&self.url(DUTY_SLIP_PATH))
                .json(slip)
                .send(request_id)
                .await
                .map_err(network_failure)?;
            body_or_null(accept(response).await?).await
        }
        .await;

        observe("create_duty_slip", result)
    }

    #[tracing::instrument(skip(self, slip))]
    pub async fn update_duty_slip(
        &self,
        id: &str,
        slip: &DutySlip,
        request_id: Option<&str>,
    ) -> DutyResult<Value> {
        let url = self.url(&format!("{}/{}", DUTY_SLIP_PATH, id));
        let result = async {
            let response = self
                .client
                .traced_patch(&url)
                .json(slip)
                .send(request_id)
                .await
                .map_err(network_failure)?;
            body_or_null(accept(response).await?).await
        }
        .await;

        observe("update_duty_slip", result)
    }

    /// Succeeds when the rate API answers its catalog endpoint.
    pub async fn ping(&self) -> DutyResult<()> {
        let response = self
            .client
            .traced_get(&self.url(CUSTOMER_RATE_PATH))
            .send(None)
            .await
            .map_err(network_failure)?;
        accept(response).await.map(|_| ())
    }
}

fn network_failure(err: reqwest::Error) -> DutyError {
    DutyError::NetworkFailure(err.to_string())
}

fn observe<T>(operation: &str, result: DutyResult<T>) -> DutyResult<T> {
    if let Err(e) = &result {
        record_upstream_error(operation);
        tracing::warn!(operation = operation, error = %e, "Rate API call failed");
    }
    result
}

/// Pass 2xx responses through; anything else becomes `UpstreamRejected`.
async fn accept(response: Response) -> DutyResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body
    };

    Err(DutyError::UpstreamRejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> DutyResult<T> {
    let status = response.status().as_u16();
    response
        .json::<T>()
        .await
        .map_err(|e| DutyError::UpstreamRejected {
            status,
            message: format!("unreadable response body: {}", e),
        })
}

async fn body_or_null(response: Response) -> DutyResult<Value> {
    let body = response.text().await.map_err(network_failure)?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}
