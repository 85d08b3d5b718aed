//! Duty slip model: the trip form and its settlement.

use super::lenient;
use super::RateTitle;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicle offered on the duty slip form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VehicleType {
    #[serde(rename = "Sedan Car")]
    SedanCar,
    #[serde(rename = "Mini Car")]
    MiniCar,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::SedanCar => "Sedan Car",
            VehicleType::MiniCar => "Mini Car",
        }
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedan car" => Ok(VehicleType::SedanCar),
            "mini car" => Ok(VehicleType::MiniCar),
            other => Err(format!("unknown vehicle type '{}'", other)),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Cash")]
    Cash,
    #[serde(rename = "Google Pay")]
    GooglePay,
    #[serde(rename = "Paytm")]
    Paytm,
    #[serde(rename = "Phone Pay")]
    PhonePay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::GooglePay => "Google Pay",
            PaymentMethod::Paytm => "Paytm",
            PaymentMethod::PhonePay => "Phone Pay",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bank transfer" => Ok(PaymentMethod::BankTransfer),
            "cash" => Ok(PaymentMethod::Cash),
            "google pay" => Ok(PaymentMethod::GooglePay),
            "paytm" => Ok(PaymentMethod::Paytm),
            "phone pay" => Ok(PaymentMethod::PhonePay),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the operator types into the duty slip form.
///
/// Accepts the form's own field names (`companyname`, `closingkm`, ...) as
/// aliases. Totals are never read from here; they are computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DutySlipDraft {
    #[serde(default, alias = "companyname", deserialize_with = "lenient::text")]
    pub company_name: String,
    #[serde(default, alias = "dutyslipno", deserialize_with = "lenient::text")]
    pub duty_slip_no: String,
    #[serde(default, alias = "reportingaddress", deserialize_with = "lenient::text")]
    pub reporting_address: String,
    #[serde(default, deserialize_with = "lenient::option_from_str")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::option_from_str")]
    pub vehicle: Option<VehicleType>,
    #[serde(default, alias = "vehiclenumber", deserialize_with = "lenient::text")]
    pub vehicle_number: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub to: String,
    #[serde(default, alias = "startingkm", deserialize_with = "lenient::option_from_str")]
    pub starting_km: Option<Decimal>,
    #[serde(default, alias = "closingkm", deserialize_with = "lenient::option_from_str")]
    pub closing_km: Option<Decimal>,
    #[serde(default, alias = "startingtime", with = "lenient::clock_time")]
    pub starting_time: Option<NaiveTime>,
    #[serde(default, alias = "closingtime", with = "lenient::clock_time")]
    pub closing_time: Option<NaiveTime>,
    #[serde(default)]
    pub title: RateTitle,
    #[serde(
        default,
        alias = "advanceamount",
        deserialize_with = "lenient::option_from_str"
    )]
    pub advance_amount: Option<Decimal>,
    #[serde(
        default,
        alias = "paymentmethod",
        deserialize_with = "lenient::option_from_str"
    )]
    pub payment_method: Option<PaymentMethod>,
}

/// Who owes the remaining balance once the advance is deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "amount", rename_all = "snake_case")]
pub enum Balance {
    OwedByCustomer(Decimal),
    Settled,
    /// The advance exceeded the charges; the business owes the difference.
    OwedByBusiness(Decimal),
}

impl Balance {
    pub fn from_total(total_amount: Decimal) -> Self {
        if total_amount > Decimal::ZERO {
            Balance::OwedByCustomer(total_amount)
        } else if total_amount < Decimal::ZERO {
            Balance::OwedByBusiness(-total_amount)
        } else {
            Balance::Settled
        }
    }
}

/// Non-fatal conditions found while settling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementWarning {
    /// The plan title names no distance, so no extra km were billed.
    UnparseableTitle { title: String },
    /// Extra km were driven but the plan has no rate per km.
    RatePerKmMissing { rate_id: String },
}

impl SettlementWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            SettlementWarning::UnparseableTitle { .. } => "unparseable_title",
            SettlementWarning::RatePerKmMissing { .. } => "rate_per_km_missing",
        }
    }
}

/// Computed totals of a duty slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub rate_id: String,
    pub total_km: Decimal,
    pub total_hours: Decimal,
    pub included_km: Option<Decimal>,
    pub included_hours: Decimal,
    pub extra_km: Decimal,
    pub extra_hours: Decimal,
    pub base_amount: Decimal,
    pub extra_km_amount: Decimal,
    pub extra_hour_amount: Decimal,
    /// Advance taken off the total; 0 when the form left it blank.
    pub advance_deducted: Decimal,
    pub total_amount: Decimal,
    pub balance: Balance,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SettlementWarning>,
}

/// A settled duty slip, the payload persisted upstream.
///
/// Both halves are flattened into one object, so their field names must not
/// overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutySlip {
    #[serde(flatten)]
    pub draft: DutySlipDraft,
    #[serde(flatten)]
    pub settlement: Settlement,
}
