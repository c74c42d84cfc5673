use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::formats::{date_prefix, string_or_number};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Salary {
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub id: String,
    pub value: Decimal,
    #[serde(with = "date_prefix")]
    pub date: NaiveDate,
}

/// Body of `POST /salaries`. The backend upserts by the month of `date`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SalaryPayload {
    pub value: Decimal,
    #[serde(with = "date_prefix")]
    pub date: NaiveDate,
}
