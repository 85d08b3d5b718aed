//! Customer rate model.
//!
//! Field names on the wire follow the upstream rate API.

use super::lenient;
use super::RateTitle;
use crate::error::{DutyError, DutyResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One negotiated billing agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "company_Name", default, deserialize_with = "lenient::text")]
    pub company_name: String,
    #[serde(
        rename = "customer_Name",
        default,
        deserialize_with = "lenient::option_text"
    )]
    pub customer_name: Option<String>,
    #[serde(rename = "GST_No", default, deserialize_with = "lenient::text")]
    pub gst_no: String,
    #[serde(rename = "mobile_Number", default, deserialize_with = "lenient::text")]
    pub mobile_number: String,
    #[serde(default, deserialize_with = "lenient::option_from_str")]
    pub rate_per_km: Option<Decimal>,
    #[serde(default)]
    pub title: RateTitle,
    #[serde(default, deserialize_with = "lenient::option_from_str")]
    pub rate: Option<Decimal>,
}

/// Changed fields of a customer rate. The identifier is never patched.
///
/// Text fields may be cleared with `""`; blank amounts are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatePatch {
    #[serde(
        rename = "company_Name",
        default,
        deserialize_with = "lenient::nullable_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub company_name: Option<String>,
    #[serde(
        rename = "customer_Name",
        default,
        deserialize_with = "lenient::nullable_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_name: Option<String>,
    #[serde(
        rename = "GST_No",
        default,
        deserialize_with = "lenient::nullable_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gst_no: Option<String>,
    #[serde(
        rename = "mobile_Number",
        default,
        deserialize_with = "lenient::nullable_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub mobile_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_from_str",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_per_km: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<RateTitle>,
    #[serde(
        default,
        deserialize_with = "lenient::option_from_str",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate: Option<Decimal>,
}

impl RatePatch {
    pub fn check_amounts(&self) -> DutyResult<()> {
        check_amounts(self.rate_per_km, self.rate)
    }

    /// The record with every field present in the patch replaced.
    pub fn merge_into(&self, record: &CustomerRate) -> CustomerRate {
        let mut merged = record.clone();

        if let Some(company_name) = &self.company_name {
            merged.company_name = company_name.clone();
        }
        if let Some(customer_name) = &self.customer_name {
            merged.customer_name = Some(customer_name.clone()).filter(|n| !n.trim().is_empty());
        }
        if let Some(gst_no) = &self.gst_no {
            merged.gst_no = gst_no.clone();
        }
        if let Some(mobile_number) = &self.mobile_number {
            merged.mobile_number = mobile_number.clone();
        }
        if let Some(rate_per_km) = self.rate_per_km {
            merged.rate_per_km = Some(rate_per_km);
        }
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(rate) = self.rate {
            merged.rate = Some(rate);
        }

        merged
    }
}

/// Input for creating a customer rate; the upstream API assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCustomerRate {
    #[serde(rename = "company_Name")]
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[serde(rename = "customer_Name")]
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[serde(rename = "GST_No", default)]
    pub gst_no: String,
    #[serde(rename = "mobile_Number", deserialize_with = "lenient::text")]
    #[validate(length(min = 10, message = "Mobile number must be at least 10 characters"))]
    pub mobile_number: String,
    #[serde(default, deserialize_with = "lenient::option_from_str")]
    pub rate_per_km: Option<Decimal>,
    #[serde(default)]
    pub title: RateTitle,
    #[serde(default, deserialize_with = "lenient::option_from_str")]
    pub rate: Option<Decimal>,
}

impl NewCustomerRate {
    pub fn check_amounts(&self) -> DutyResult<()> {
        check_amounts(self.rate_per_km, self.rate)
    }
}

fn check_amounts(rate_per_km: Option<Decimal>, rate: Option<Decimal>) -> DutyResult<()> {
    for (field, value) in [("rate_per_km", rate_per_km), ("rate", rate)] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(DutyError::InvalidInput(format!("{} must not be negative", field)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_records_typed_into_the_edit_form() {
        let record: CustomerRate = serde_json::from_value(json!({
            "_id": "65a1",
            "company_Name": "Acme Travels",
            "customer_Name": "",
            "GST_No": "27ABCDE1234F1Z5",
            "mobile_Number": 9876543210u64,
            "rate_per_km": "12",
            "title": "One Day / 80km",
            "rate": 2000
        }))
        .unwrap();

        assert_eq!(record.customer_name, None);
        assert_eq!(record.mobile_number, "9876543210");
        assert_eq!(record.rate_per_km, Some(Decimal::from(12)));
        assert_eq!(record.rate, Some(Decimal::from(2000)));
    }

    #[test]
    fn merge_only_touches_patched_fields() {
        let record = CustomerRate {
            id: "r1".into(),
            company_name: "Acme".into(),
            customer_name: Some("Ravi".into()),
            gst_no: "GST1".into(),
            mobile_number: "9876543210".into(),
            rate_per_km: Some(Decimal::from(12)),
            title: RateTitle::from("One Day / 80km"),
            rate: Some(Decimal::from(2000)),
        };
        let patch = RatePatch {
            rate: Some(Decimal::from(2100)),
            gst_no: Some(String::new()),
            ..Default::default()
        };

        let merged = patch.merge_into(&record);

        assert_eq!(merged.rate, Some(Decimal::from(2100)));
        assert_eq!(merged.gst_no, "");
        assert_eq!(merged.id, record.id);
        assert_eq!(merged.customer_name, record.customer_name);
        assert_eq!(merged.rate_per_km, record.rate_per_km);
    }

    #[test]
    fn full_record_body_is_accepted_as_patch() {
        let patch: RatePatch = serde_json::from_value(json!({
            "_id": "r1",
            "company_Name": "Acme",
            "rate": ""
        }))
        .unwrap();

        assert_eq!(patch.company_name.as_deref(), Some("Acme"));
        assert_eq!(patch.rate, None);
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let patch = RatePatch {
            rate_per_km: Some(Decimal::from(-1)),
            ..Default::default()
        };
        assert!(matches!(patch.check_amounts(), Err(DutyError::InvalidInput(_))));
        assert!(RatePatch::default().check_amounts().is_ok());
    }
}
