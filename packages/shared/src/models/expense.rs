use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::formats::{date_prefix, string_or_number};

fn default_installments() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub category_id: String,
    pub value: Decimal,
    #[serde(with = "date_prefix")]
    pub date: NaiveDate,
    pub payment_method: String,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default = "default_installments")]
    pub installments: u32,
    #[serde(default, alias = "isPaid")]
    pub paid: bool,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /expenses`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    pub category_id: String,
    pub value: Decimal,
    #[serde(with = "date_prefix")]
    pub date: NaiveDate,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    pub installments: u32,
    pub paid: bool,
    pub description: String,
}

/// Body of `PUT /expenses/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpensePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateExpensePayload {
    pub fn mark_paid(paid: bool) -> Self {
        Self {
            paid: Some(paid),
            ..Self::default()
        }
    }

    /// Merges the present fields into a cached expense.
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(category_id) = &self.category_id {
            expense.category_id = category_id.clone();
        }
        if let Some(value) = self.value {
            expense.value = value;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(payment_method) = &self.payment_method {
            expense.payment_method = payment_method.clone();
        }
        if let Some(card) = &self.card {
            expense.card = Some(card.clone());
        }
        if let Some(installments) = self.installments {
            expense.installments = installments;
        }
        if let Some(paid) = self.paid {
            expense.paid = paid;
        }
        if let Some(description) = &self.description {
            expense.description = description.clone();
        }
    }
}
