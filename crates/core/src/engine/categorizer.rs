use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rules::{
    self, PolicyLimits, AIRFARE_HINTS, CAR_RENTAL_HINTS, CATEGORY_MEALS, CATEGORY_TRANSPORTATION,
    MEAL_TIME_HINTS, MISC_TRANSPORT_HINTS, RIDESHARE_HINTS,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategorizationInput {
    pub description: String,
    pub merchant: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub category: String,
    pub subcategory: String,
    pub confidence: f64,
    pub alternative_categories: Vec<CategoryScore>,
}

impl CategorizationResult {
    /// Result when nothing matched. Confidence is exactly zero so callers
    /// can distinguish "no evidence" from a weak match.
    pub fn fallback() -> Self {
        Self {
            category: rules::CATEGORY_FALLBACK.to_string(),
            subcategory: "other".to_string(),
            confidence: 0.0,
            alternative_categories: Vec::new(),
        }
    }
}

pub trait CategorizationEngine: Send + Sync {
    fn categorize(&self, input: &CategorizationInput) -> CategorizationResult;
}

#[derive(Clone, Debug, Default)]
pub struct KeywordCategorizer {
    limits: PolicyLimits,
}

impl KeywordCategorizer {
    pub fn new(limits: PolicyLimits) -> Self {
        Self { limits }
    }
}

impl CategorizationEngine for KeywordCategorizer {
    fn categorize(&self, input: &CategorizationInput) -> CategorizationResult {
        categorize_input(input, &self.limits)
    }
}

pub fn categorize_input(input: &CategorizationInput, limits: &PolicyLimits) -> CategorizationResult {
    let description = input.description.to_lowercase();
    let merchant = input.merchant.to_lowercase();

    // One score per table, in declaration order. Max-wins within a table:
    // a single strong keyword dominates weaker matches for the same
    // category.
    let mut scores: Vec<CategoryScore> = Vec::new();
    for (category, table) in rules::CATEGORY_TABLES {
        let mut best: Option<f64> = None;
        for (keyword, weight) in *table {
            if description.contains(keyword) || merchant.contains(keyword) {
                best = Some(best.map_or(*weight, |current| current.max(*weight)));
            }
        }
        if let Some(confidence) = best {
            scores.push(CategoryScore { category: (*category).to_string(), confidence });
        }
    }

    if scores.is_empty() {
        return CategorizationResult::fallback();
    }

    // Stable sort keeps declaration order among equal scores, so the first
    // table to reach the top score wins ties.
    scores.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));

    let winner = scores[0].clone();
    let alternative_categories = scores.into_iter().skip(1).take(2).collect();
    let subcategory = subcategory_for(&winner.category, &description, input.amount, limits);

    CategorizationResult {
        category: winner.category,
        subcategory,
        confidence: winner.confidence,
        alternative_categories,
    }
}

fn subcategory_for(
    category: &str,
    description: &str,
    amount: Decimal,
    limits: &PolicyLimits,
) -> String {
    let matched = |hints: &[&str]| hints.iter().any(|hint| description.contains(hint));

    let subcategory = match category {
        CATEGORY_TRANSPORTATION => {
            if matched(AIRFARE_HINTS) {
                "airfare"
            } else if matched(RIDESHARE_HINTS) {
                "rideshare"
            } else if matched(CAR_RENTAL_HINTS) {
                "car_rental"
            } else if matched(MISC_TRANSPORT_HINTS) {
                "misc_transport"
            } else {
                "general"
            }
        }
        CATEGORY_MEALS => {
            if amount > limits.business_meal_threshold {
                "business_meal"
            } else {
                MEAL_TIME_HINTS
                    .iter()
                    .find(|hint| description.contains(*hint))
                    .copied()
                    .unwrap_or("general")
            }
        }
        _ => "general",
    };

    subcategory.to_string()
}
