//! Duty slip settlement: distance, duration and the amount owed.

use crate::error::{DutyError, DutyResult};
use crate::models::{
    Balance, CustomerRate, DutySlip, DutySlipDraft, Settlement, SettlementWarning,
};
use crate::services::rate_lookup::find_plan;
use chrono::NaiveTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Billing knobs that are not written on the rate plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettlementPolicy {
    /// Charged for every hour beyond the plan's included hours.
    #[serde(default = "default_extra_hour_rate")]
    pub extra_hour_rate: Decimal,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: u32,
}

fn default_extra_hour_rate() -> Decimal {
    Decimal::from(100)
}

fn default_hours_per_day() -> u32 {
    24
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            extra_hour_rate: default_extra_hour_rate(),
            hours_per_day: default_hours_per_day(),
        }
    }
}

/// Rounds an amount to paise, midpoint away from zero.
pub fn money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn out_of_range() -> DutyError {
    DutyError::InvalidInput("amount out of range".to_string())
}

pub fn total_km(starting_km: Decimal, closing_km: Decimal) -> DutyResult<Decimal> {
    if closing_km < starting_km {
        return Err(DutyError::InvalidRange {
            starting: starting_km,
            closing: closing_km,
        });
    }
    closing_km.checked_sub(starting_km).ok_or_else(out_of_range)
}

/// Unrounded hours between two clock readings; a closing time before the
/// starting time wrapped past midnight.
fn elapsed_hours(starting_time: NaiveTime, closing_time: NaiveTime) -> Decimal {
    let mut minutes = closing_time.signed_duration_since(starting_time).num_minutes();
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }
    Decimal::from(minutes) / Decimal::from(60)
}

/// Hours between two clock readings, to 2 places.
pub fn total_hours(starting_time: NaiveTime, closing_time: NaiveTime) -> Decimal {
    money(elapsed_hours(starting_time, closing_time))
}

/// Base + extras − advance, signed.
pub fn total_amount(
    base_amount: Decimal,
    extra_km_amount: Decimal,
    extra_hour_amount: Decimal,
    advance_amount: Decimal,
) -> DutyResult<Decimal> {
    base_amount
        .checked_add(extra_km_amount)
        .and_then(|sum| sum.checked_add(extra_hour_amount))
        .and_then(|sum| sum.checked_sub(advance_amount))
        .map(money)
        .ok_or_else(out_of_range)
}

fn required<T: Copy>(value: Option<T>, field: &str) -> DutyResult<T> {
    value.ok_or_else(|| DutyError::InvalidInput(format!("{} is required", field)))
}

/// `quantity × rate` rounded to money.
fn charge(quantity: Decimal, rate: Decimal) -> DutyResult<Decimal> {
    quantity.checked_mul(rate).map(money).ok_or_else(out_of_range)
}

/// Settle a draft against a catalog snapshot.
pub fn settle(
    draft: &DutySlipDraft,
    catalog: &[CustomerRate],
    policy: &SettlementPolicy,
) -> DutyResult<Settlement> {
    let starting_km = required(draft.starting_km, "starting_km")?;
    let closing_km = required(draft.closing_km, "closing_km")?;
    let starting_time = required(draft.starting_time, "starting_time")?;
    let closing_time = required(draft.closing_time, "closing_time")?;

    let advance_amount = draft.advance_amount.unwrap_or(Decimal::ZERO);
    if advance_amount < Decimal::ZERO {
        return Err(DutyError::InvalidInput(
            "advance_amount must not be negative".to_string(),
        ));
    }

    let total_km = total_km(starting_km, closing_km)?;
    let elapsed = elapsed_hours(starting_time, closing_time);

    let plan = find_plan(&draft.company_name, &draft.title, catalog)?;
    let base_amount = money(plan.rate.unwrap_or(Decimal::ZERO));

    let mut warnings = Vec::new();

    let (included_km, extra_km) = match plan.title.included_km() {
        Ok(included) => {
            let extra = total_km.checked_sub(included).ok_or_else(out_of_range)?;
            (Some(included), extra.max(Decimal::ZERO))
        }
        Err(_) => {
            warnings.push(SettlementWarning::UnparseableTitle {
                title: plan.title.to_string(),
            });
            (None, Decimal::ZERO)
        }
    };

    let extra_km_amount = match plan.rate_per_km {
        Some(rate_per_km) => charge(extra_km, rate_per_km)?,
        None => {
            if extra_km > Decimal::ZERO {
                warnings.push(SettlementWarning::RatePerKmMissing {
                    rate_id: plan.id.clone(),
                });
            }
            Decimal::ZERO
        }
    };

    let included_hours = plan.title.included_hours(policy.hours_per_day);
    let extra_hours = (elapsed - included_hours).max(Decimal::ZERO);
    let extra_hour_amount = charge(extra_hours, policy.extra_hour_rate)?;

    let total_amount = total_amount(base_amount, extra_km_amount, extra_hour_amount, advance_amount)?;

    Ok(Settlement {
        rate_id: plan.id.clone(),
        total_km,
        total_hours: money(elapsed),
        included_km,
        included_hours,
        extra_km,
        extra_hours: money(extra_hours),
        base_amount,
        extra_km_amount,
        extra_hour_amount,
        advance_deducted: money(advance_amount),
        total_amount,
        balance: Balance::from_total(total_amount),
        warnings,
    })
}

impl DutySlip {
    /// Bundle a draft with its settlement.
    pub fn settle(
        draft: DutySlipDraft,
        catalog: &[CustomerRate],
        policy: &SettlementPolicy,
    ) -> DutyResult<Self> {
        let settlement = settle(&draft, catalog, policy)?;
        Ok(Self { draft, settlement })
    }
}
