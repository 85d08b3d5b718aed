pub mod duty_slips;
pub mod health;
pub mod rates;

pub use duty_slips::{create_duty_slip, settle_duty_slip, update_duty_slip};
pub use health::{health_check, metrics, readiness_check};
pub use rates::{create_rate, delete_rate, list_plans, list_rates, update_rate};

use crate::error::DutyError;
use crate::models::CustomerRate;
use crate::startup::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use service_core::error::AppError;

/// Handler failure. A write the rate API refused keeps the unsaved value so
/// the operator can retry without retyping it.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Pending { error: DutyError, pending: Value },
}

impl ApiError {
    pub fn pending<T: serde::Serialize>(error: DutyError, pending: &T) -> Self {
        let pending = serde_json::to_value(pending).unwrap_or(Value::Null);
        ApiError::Pending { error, pending }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::App(err) => err.into_response(),
            ApiError::Pending { error, pending } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": error.to_string(),
                    "pending": pending,
                })),
            )
                .into_response(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<DutyError> for ApiError {
    fn from(err: DutyError) -> Self {
        ApiError::App(err.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::App(err.into())
    }
}

/// Fresh catalog snapshot for one request.
pub(crate) async fn fetch_catalog(
    state: &AppState,
    request_id: Option<&str>,
) -> Result<Vec<CustomerRate>, DutyError> {
    let catalog = state.rate_client.list_rates(request_id).await?;
    tracing::debug!(records = catalog.len(), "Fetched customer rate catalog");
    Ok(catalog)
}
