//! Rate plan title, e.g. "One Day / 80km".
//!
//! The title is both the key that ties a duty slip to a customer's rate plan
//! and the only place a plan's allowance is written down.

use crate::error::{DutyError, DutyResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

static INCLUDED_KM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*kms?\b").expect("included km pattern is valid")
});

static INCLUDED_HOURS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(?:hrs?|hours?)\b")
        .expect("included hours pattern is valid")
});

static DAY_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(half|one|two|three|four|five|six|seven|\d+)\s*days?\b")
        .expect("day count pattern is valid")
});

/// A number as written in a title; "1,000" reads as 1000.
fn title_number(digits: &str) -> Option<Decimal> {
    Decimal::from_str(&digits.replace(',', "")).ok()
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RateTitle(String);

impl RateTitle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Comparison key: lowercase, single spaces, no spaces around `/`.
    pub fn key(&self) -> String {
        self.0
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replace(" /", "/")
            .replace("/ ", "/")
    }

    /// Kilometres bundled into the plan ("80km" -> 80).
    pub fn included_km(&self) -> DutyResult<Decimal> {
        INCLUDED_KM
            .captures(&self.0)
            .and_then(|caps| title_number(&caps[1]))
            .ok_or_else(|| DutyError::UnparseableTitle(self.0.clone()))
    }

    /// Hours bundled into the plan.
    ///
    /// An explicit "8hr" wins, then a day count ("One Day", "2 Days",
    /// "Half Day"), then a single day.
    pub fn included_hours(&self, hours_per_day: u32) -> Decimal {
        let day = Decimal::from(hours_per_day);

        if let Some(hours) = INCLUDED_HOURS
            .captures(&self.0)
            .and_then(|caps| title_number(&caps[1]))
        {
            return hours;
        }

        let days = DAY_COUNT.captures(&self.0).and_then(|caps| {
            let word = caps[1].to_lowercase();
            match word.as_str() {
                "half" => Some(Decimal::new(5, 1)),
                "one" => Some(Decimal::from(1)),
                "two" => Some(Decimal::from(2)),
                "three" => Some(Decimal::from(3)),
                "four" => Some(Decimal::from(4)),
                "five" => Some(Decimal::from(5)),
                "six" => Some(Decimal::from(6)),
                "seven" => Some(Decimal::from(7)),
                digits => Decimal::from_str(digits).ok(),
            }
        });

        days.unwrap_or(Decimal::ONE)
            .checked_mul(day)
            .unwrap_or(Decimal::MAX)
    }
}

impl PartialEq for RateTitle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RateTitle {}

impl Hash for RateTitle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for RateTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RateTitle {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RateTitle {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl<'de> Deserialize<'de> for RateTitle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
    }
}
