//! Serde adapters for the loosely typed fields the backend returns.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Parses the calendar date at the start of an ISO-8601 string, so both
/// `2025-01-15` and `2025-01-15T00:00:00Z` yield the same day.
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

pub mod date_prefix {
    use super::*;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date_prefix(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Integer(number) => number.to_string(),
        }
    }
}

/// Identifiers arrive as JSON strings or numbers depending on the endpoint.
pub mod string_or_number {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(String::from)
    }
}

pub mod option_string_or_number {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "string_or_number::deserialize")]
        id: String,
        #[serde(default, deserialize_with = "option_string_or_number::deserialize")]
        household: Option<String>,
        #[serde(with = "date_prefix")]
        date: NaiveDate,
    }

    #[test]
    fn test_parse_date_prefix_accepts_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_date_prefix("2025-01-15"), Some(expected));
        assert_eq!(parse_date_prefix("2025-01-15T10:30:00Z"), Some(expected));
        assert_eq!(parse_date_prefix("2025-01"), None);
        assert_eq!(parse_date_prefix("not-a-date"), None);
    }

    #[test]
    fn test_numeric_and_textual_identifiers() {
        let numeric: Wrapper =
            serde_json::from_str(r#"{"id": 42, "household": 7, "date": "2025-02-01T00:00:00"}"#)
                .unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(numeric.household.as_deref(), Some("7"));

        let textual: Wrapper =
            serde_json::from_str(r#"{"id": "abc", "date": "2025-02-01"}"#).unwrap();
        assert_eq!(textual.id, "abc");
        assert_eq!(textual.household, None);
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let result = serde_json::from_str::<Wrapper>(r#"{"id": 1, "date": "yesterday"}"#);
        assert!(result.is_err());
    }
}
