use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::expense::{parse_expense_date, ExpenseDraft, ExpenseRecord};
use crate::errors::DomainError;

use super::rules::{
    PolicyLimits, CATEGORY_AIRFARE, CATEGORY_LODGING, CATEGORY_MEALS, CATEGORY_TRANSPORTATION,
    POLICY_ACCOMMODATION_LIMITS, POLICY_DOCUMENTATION, POLICY_MEAL_ALLOWANCES, RIDESHARE_HINTS,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
    pub required_documents: Vec<String>,
    pub policy_references: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            violations: Vec::new(),
            warnings: Vec::new(),
            required_documents: Vec::new(),
            policy_references: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Result for input that could not be turned into a record at all. The
    /// failure travels as a violation, never as an error.
    pub fn processing_failure(error: &DomainError) -> Self {
        Self {
            is_valid: false,
            violations: vec![format!("Error validating expense data: {error}")],
            ..Self::default()
        }
    }
}

pub trait ValidationEngine: Send + Sync {
    fn validate(&self, record: &ExpenseRecord) -> ValidationResult;
}

#[derive(Clone, Debug, Default)]
pub struct PolicyValidator {
    limits: PolicyLimits,
}

impl PolicyValidator {
    pub fn new(limits: PolicyLimits) -> Self {
        Self { limits }
    }

    pub fn validate_draft(&self, draft: &ExpenseDraft) -> ValidationResult {
        match draft.resolve() {
            Ok(record) => validate_record(&record, &self.limits),
            Err(error) => ValidationResult::processing_failure(&error),
        }
    }
}

impl ValidationEngine for PolicyValidator {
    fn validate(&self, record: &ExpenseRecord) -> ValidationResult {
        validate_record(record, &self.limits)
    }
}

/// Applies every policy rule whose category matches. Rules are independent:
/// none short-circuits another, and `is_valid` is exactly "no violations".
pub fn validate_record(record: &ExpenseRecord, limits: &PolicyLimits) -> ValidationResult {
    let mut result = ValidationResult::default();
    let category = record.category.trim().to_lowercase();
    let description = record.description.to_lowercase();
    let amount = record.amount;

    match category.as_str() {
        CATEGORY_MEALS => {
            if amount > limits.meal_daily_limit {
                result.violations.push(format!(
                    "Meal expense of ${amount} exceeds daily policy limit of ${}",
                    limits.meal_daily_limit
                ));
                result.policy_references.push(POLICY_MEAL_ALLOWANCES.to_string());
            }

            if amount > limits.meal_receipt_threshold {
                result.required_documents.push(format!(
                    "Receipt required for meals over ${}",
                    limits.meal_receipt_threshold
                ));
            }

            if amount > limits.meal_justification_threshold && !description.contains("business") {
                result
                    .warnings
                    .push("High meal expense should include business justification".to_string());
            }
        }
        CATEGORY_LODGING => {
            if amount > limits.lodging_nightly_limit {
                result.violations.push(format!(
                    "Lodging expense of ${amount} exceeds nightly limit of ${}",
                    limits.lodging_nightly_limit
                ));
                result.policy_references.push(POLICY_ACCOMMODATION_LIMITS.to_string());
            }
        }
        CATEGORY_TRANSPORTATION => {
            let rideshare = RIDESHARE_HINTS.iter().any(|hint| description.contains(hint));
            if rideshare && amount > limits.rideshare_review_threshold {
                result.warnings.push(format!(
                    "Ride-share expenses over ${} may require business justification",
                    limits.rideshare_review_threshold
                ));
            }

            if description.contains("rental") && amount > limits.car_rental_document_threshold {
                result
                    .required_documents
                    .push("Car rental agreement and fuel receipts required".to_string());
            }
        }
        CATEGORY_AIRFARE => {
            if amount > limits.airfare_review_threshold {
                result.warnings.push(format!(
                    "Airfare over ${} may require manager approval for business class",
                    limits.airfare_review_threshold
                ));
                result.required_documents.push("Flight itinerary and boarding passes".to_string());
            }
        }
        _ => {}
    }

    if amount > limits.universal_receipt_threshold && !record.has_receipt {
        result.required_documents.push(format!(
            "Receipt required for all expenses over ${}",
            limits.universal_receipt_threshold
        ));
        result.policy_references.push(POLICY_DOCUMENTATION.to_string());
    }

    // Malformed dates skip this rule only; everything above still applies.
    if let Some(date) = record.date.as_deref().and_then(parse_expense_date) {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            result.warnings.push("Weekend expense flagged for review".to_string());
        }
    }

    result.is_valid = result.violations.is_empty();
    result
}
