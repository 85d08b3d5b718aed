//! Deserializers for values typed into the admin forms.
//!
//! The screens post text inputs verbatim, so numbers arrive as JSON numbers,
//! numeric strings or blank strings. Blank always means "not entered".

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

fn raw_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Parse `T` from a string or number; null and blank become `None`.
pub fn option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let Some(text) = raw_text(deserializer)? else {
        return Ok(None);
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid value '{}': {}", trimmed, e)))
}

/// Free text; null becomes the empty string, numbers keep their digits.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw_text(deserializer)?.unwrap_or_default())
}

/// Text where null means "not sent" but blank is kept as a value.
pub fn nullable_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    raw_text(deserializer)
}

/// Optional free text; null and blank become `None`. The value is not trimmed.
pub fn option_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw_text(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Clock readings as `HH:MM` (seconds accepted on input, dropped on output).
pub mod clock_time {
    use super::*;
    use serde::Serializer;

    const INPUT_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

    pub fn parse(text: &str) -> Option<NaiveTime> {
        let trimmed = text.trim();
        INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
    }

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(text) = raw_text(deserializer)? else {
            return Ok(None);
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        parse(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid clock time '{}'", text)))
    }
}
