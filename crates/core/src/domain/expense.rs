use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Amount as submitted through a tool call: the hosted agent framework
/// delivers either a JSON number or free text, and malformed values must
/// degrade to a diagnostic rather than a deserialization failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(f64),
    Text(String),
}

impl Default for AmountField {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl AmountField {
    pub fn as_decimal(&self) -> Result<Decimal, DomainError> {
        let amount = match self {
            Self::Number(value) => Decimal::try_from(*value)
                .map_err(|_| DomainError::InvalidAmount(value.to_string()))?,
            Self::Text(raw) => raw
                .trim()
                .parse::<Decimal>()
                .map_err(|_| DomainError::InvalidAmount(raw.clone()))?,
        };

        if amount < Decimal::ZERO {
            return Err(DomainError::NegativeAmount(amount.to_string()));
        }

        Ok(amount)
    }
}

/// Expense fields as collected during a conversation, before any rule has
/// run. Every field is optional or defaulted so a partially filled tool
/// payload still deserializes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseDraft {
    pub amount: AmountField,
    pub category: String,
    pub description: String,
    pub merchant: Option<String>,
    pub date: Option<String>,
    pub has_receipt: bool,
    pub location: Option<String>,
}

impl ExpenseDraft {
    /// Converts the draft into a typed record. The only way this fails is a
    /// non-numeric or negative amount; everything else degrades inside the
    /// engines instead.
    pub fn resolve(&self) -> Result<ExpenseRecord, DomainError> {
        Ok(ExpenseRecord {
            amount: self.amount.as_decimal()?,
            category: self.category.clone(),
            description: self.description.clone(),
            merchant: self.merchant.clone(),
            date: self.date.clone(),
            has_receipt: self.has_receipt,
            location: self.location.clone(),
        })
    }
}

/// A fully resolved expense. Immutable input to validation and aggregation;
/// the date stays a raw string because a malformed date only disables the
/// weekend rule, it never invalidates the record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub merchant: Option<String>,
    pub date: Option<String>,
    pub has_receipt: bool,
    pub location: Option<String>,
}

/// Parses an expense date, accepting a plain calendar date, an ISO-8601
/// timestamp without an offset, or a full RFC 3339 timestamp. Returns
/// `None` for anything else so callers can skip date-dependent rules.
pub fn parse_expense_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = trimmed.parse::<NaiveDate>() {
        return Some(date);
    }

    if let Ok(timestamp) = trimmed.parse::<NaiveDateTime>() {
        return Some(timestamp.date());
    }

    DateTime::parse_from_rfc3339(trimmed).ok().map(|timestamp| timestamp.date_naive())
}
