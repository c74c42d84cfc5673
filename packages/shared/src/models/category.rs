use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::formats::string_or_number;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub ideal_percentage: Option<Decimal>,
}

impl Category {
    /// Names are kept upper-case so lookups are case-insensitive.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.to_uppercase();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryPayload {
    pub name: String,
    pub icon: String,
}

impl CategoryPayload {
    pub fn new(name: &str, icon: &str) -> Self {
        Self {
            name: name.trim().to_uppercase(),
            icon: icon.to_string(),
        }
    }
}

/// One entry of `POST /categories/batch-update-percentages`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPercentageUpdate {
    pub category_id: String,
    pub ideal_percentage: Decimal,
}
