//! Queries and edits over a customer rate catalog snapshot.
//!
//! Everything here is pure: the catalog is borrowed, never mutated, and no
//! I/O happens. Persisting an edit is the rate client's job.

use crate::error::{DutyError, DutyResult};
use crate::models::{CustomerRate, RatePatch, RateTitle};

/// Records whose customer name contains `query`, ignoring case.
///
/// An empty query returns the whole catalog. Records without a customer name
/// never match a non-empty query.
pub fn find_by_customer_name(query: &str, catalog: &[CustomerRate]) -> Vec<CustomerRate> {
    if query.is_empty() {
        return catalog.to_vec();
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|record| {
            record
                .customer_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

pub fn find_by_id<'a>(id: &str, catalog: &'a [CustomerRate]) -> DutyResult<&'a CustomerRate> {
    catalog
        .iter()
        .find(|record| record.id == id)
        .ok_or_else(|| DutyError::NotFound(id.to_string()))
}

/// A new catalog with the record `id` replaced by its merge with `patch`.
pub fn update_rate(
    id: &str,
    patch: &RatePatch,
    catalog: &[CustomerRate],
) -> DutyResult<Vec<CustomerRate>> {
    find_by_id(id, catalog)?;
    patch.check_amounts()?;

    Ok(catalog
        .iter()
        .map(|record| {
            if record.id == id {
                patch.merge_into(record)
            } else {
                record.clone()
            }
        })
        .collect())
}

/// The priced plan `title` offered to `customer`.
///
/// `customer` is matched against the company name or the customer name,
/// trimmed and ignoring case.
pub fn find_plan<'a>(
    customer: &str,
    title: &RateTitle,
    catalog: &'a [CustomerRate],
) -> DutyResult<&'a CustomerRate> {
    catalog
        .iter()
        .find(|record| {
            belongs_to(record, customer) && &record.title == title && record.rate.is_some()
        })
        .ok_or_else(|| DutyError::RateNotFound {
            customer: customer.trim().to_string(),
            title: title.to_string(),
        })
}

/// Plans offered to `customer`, in catalog order. Untitled records are skipped.
pub fn plans_for_customer<'a>(customer: &str, catalog: &'a [CustomerRate]) -> Vec<&'a CustomerRate> {
    catalog
        .iter()
        .filter(|record| belongs_to(record, customer) && !record.title.is_blank())
        .collect()
}

fn belongs_to(record: &CustomerRate, customer: &str) -> bool {
    let wanted = customer.trim().to_lowercase();
    if wanted.is_empty() {
        return false;
    }

    let matches = |name: &str| name.trim().to_lowercase() == wanted;
    matches(record.company_name.as_str()) || record.customer_name.as_deref().is_some_and(matches)
}
