use super::{fetch_catalog, ApiError};
use crate::models::{CustomerRate, NewCustomerRate, RatePatch};
use crate::services::rate_lookup;
use crate::services::record_rate_operation;
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::observability::extract_request_id;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct RateSearchParams {
    #[serde(default)]
    pub customer_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanParams {
    #[serde(default)]
    pub customer: String,
}

/// One entry of the duty slip form's title dropdown.
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub rate_id: String,
    pub title: String,
    pub rate: Option<Decimal>,
    pub rate_per_km: Option<Decimal>,
    pub included_km: Option<Decimal>,
    pub included_hours: Decimal,
}

#[tracing::instrument(skip_all, fields(customer_name = %params.customer_name))]
pub async fn list_rates(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RateSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let catalog = fetch_catalog(&state, request_id.as_deref()).await?;

    let found = rate_lookup::find_by_customer_name(&params.customer_name, &catalog);
    record_rate_operation("search");

    Ok(Json(found))
}

#[tracing::instrument(skip_all, fields(company_name = %body.company_name))]
pub async fn create_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewCustomerRate>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    body.check_amounts()?;

    let request_id = extract_request_id(&headers);
    let created = state
        .rate_client
        .create_rate(&body, request_id.as_deref())
        .await
        .map_err(|e| ApiError::pending(e, &body))?;

    record_rate_operation("create");
    tracing::info!(rate_id = %created.id, "Customer rate created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Merge the patch into the stored record and persist it.
///
/// When the rate API refuses the write, the merged record comes back as
/// `pending` with a 502.
#[tracing::instrument(skip_all, fields(rate_id = %id))]
pub async fn update_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<RatePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let catalog = fetch_catalog(&state, request_id.as_deref()).await?;

    let updated = rate_lookup::update_rate(&id, &patch, &catalog)?;
    let merged: CustomerRate = rate_lookup::find_by_id(&id, &updated)?.clone();

    state
        .rate_client
        .patch_rate(&merged, request_id.as_deref())
        .await
        .map_err(|e| ApiError::pending(e, &merged))?;

    record_rate_operation("update");
    tracing::info!(rate_id = %merged.id, "Customer rate updated");

    Ok(Json(merged))
}

#[tracing::instrument(skip_all, fields(rate_id = %id))]
pub async fn delete_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let catalog = fetch_catalog(&state, request_id.as_deref()).await?;
    rate_lookup::find_by_id(&id, &catalog)?;

    state
        .rate_client
        .delete_rate(&id, request_id.as_deref())
        .await?;

    record_rate_operation("delete");
    tracing::info!(rate_id = %id, "Customer rate deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(customer = %params.customer))]
pub async fn list_plans(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PlanParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let catalog = fetch_catalog(&state, request_id.as_deref()).await?;
    let hours_per_day = state.config.settlement.hours_per_day;

    let plans: Vec<PlanSummary> = rate_lookup::plans_for_customer(&params.customer, &catalog)
        .into_iter()
        .map(|record| PlanSummary {
            rate_id: record.id.clone(),
            title: record.title.to_string(),
            rate: record.rate,
            rate_per_km: record.rate_per_km,
            included_km: record.title.included_km().ok(),
            included_hours: record.title.included_hours(hours_per_day),
        })
        .collect();

    record_rate_operation("plans");

    Ok(Json(plans))
}
