use super::{fetch_catalog, ApiError};
use crate::error::{DutyError, DutyResult};
use crate::models::{DutySlip, DutySlipDraft};
use crate::services::{record_settlement, record_settlement_warning};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use service_core::observability::extract_request_id;

/// A settled slip together with the identifier the rate API stored it under.
#[derive(Debug, Serialize)]
pub struct StoredDutySlip {
    pub id: Option<String>,
    pub duty_slip: DutySlip,
}

fn outcome(err: &DutyError) -> &'static str {
    match err {
        DutyError::NotFound(_) => "not_found",
        DutyError::InvalidRange { .. } => "invalid_range",
        DutyError::RateNotFound { .. } => "rate_not_found",
        DutyError::UnparseableTitle(_) => "unparseable_title",
        DutyError::InvalidInput(_) => "invalid_input",
        DutyError::NetworkFailure(_) | DutyError::UpstreamRejected { .. } => "upstream_error",
    }
}

async fn settle_draft(
    state: &AppState,
    draft: DutySlipDraft,
    request_id: Option<&str>,
) -> DutyResult<DutySlip> {
    let catalog = fetch_catalog(state, request_id).await?;

    match DutySlip::settle(draft, &catalog, &state.config.settlement) {
        Ok(slip) => {
            record_settlement("settled");
            for warning in &slip.settlement.warnings {
                record_settlement_warning(warning.kind());
                tracing::warn!(warning = ?warning, "Duty slip settled with a warning");
            }
            tracing::info!(
                rate_id = %slip.settlement.rate_id,
                total_km = %slip.settlement.total_km,
                total_hours = %slip.settlement.total_hours,
                total_amount = %slip.settlement.total_amount,
                "Duty slip settled"
            );
            Ok(slip)
        }
        Err(e) => {
            record_settlement(outcome(&e));
            tracing::info!(error = %e, "Duty slip could not be settled");
            Err(e)
        }
    }
}

fn stored_id(stored: &Value) -> Option<String> {
    ["_id", "id"]
        .iter()
        .find_map(|key| stored.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Compute the totals of a duty slip without storing it.
#[tracing::instrument(skip_all, fields(duty_slip_no = %draft.duty_slip_no))]
pub async fn settle_duty_slip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<DutySlipDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let slip = settle_draft(&state, draft, request_id.as_deref()).await?;

    Ok(Json(slip))
}

#[tracing::instrument(skip_all, fields(duty_slip_no = %draft.duty_slip_no))]
pub async fn create_duty_slip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<DutySlipDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let slip = settle_draft(&state, draft, request_id.as_deref()).await?;

    let stored = state
        .rate_client
        .create_duty_slip(&slip, request_id.as_deref())
        .await
        .map_err(|e| ApiError::pending(e, &slip))?;

    let id = stored_id(&stored);
    tracing::info!(duty_slip_id = ?id, "Duty slip stored");

    Ok((
        StatusCode::CREATED,
        Json(StoredDutySlip {
            id,
            duty_slip: slip,
        }),
    ))
}

/// Re-settle an edited slip and overwrite the stored copy.
#[tracing::instrument(skip_all, fields(duty_slip_id = %id))]
pub async fn update_duty_slip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<DutySlipDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = extract_request_id(&headers);
    let slip = settle_draft(&state, draft, request_id.as_deref()).await?;

    state
        .rate_client
        .update_duty_slip(&id, &slip, request_id.as_deref())
        .await
        .map_err(|e| ApiError::pending(e, &slip))?;

    tracing::info!("Duty slip updated");

    Ok(Json(StoredDutySlip {
        id: Some(id),
        duty_slip: slip,
    }))
}
