pub mod aggregator;
pub mod categorizer;
pub mod rules;
pub mod validator;

use serde::{Deserialize, Serialize};

use crate::domain::expense::ExpenseDraft;

use self::aggregator::{AggregationEngine, ExpenseSummary, SummaryAggregator};
use self::categorizer::{
    CategorizationEngine, CategorizationInput, CategorizationResult, KeywordCategorizer,
};
use self::validator::{PolicyValidator, ValidationEngine, ValidationResult};

/// Validation and categorization of a single expense, evaluated together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEvaluation {
    pub validation: ValidationResult,
    pub categorization: CategorizationResult,
}

pub trait ExpenseRuntime: Send + Sync {
    fn validate_expense(&self, draft: &ExpenseDraft) -> ValidationResult;
    fn categorize_expense(&self, draft: &ExpenseDraft) -> CategorizationResult;
    fn summarize_expenses(&self, drafts: &[ExpenseDraft]) -> ExpenseSummary;

    fn evaluate_expense(&self, draft: &ExpenseDraft) -> ExpenseEvaluation {
        ExpenseEvaluation {
            validation: self.validate_expense(draft),
            categorization: self.categorize_expense(draft),
        }
    }
}

pub struct DeterministicExpenseRuntime<V, C, A> {
    validator: V,
    categorizer: C,
    aggregator: A,
}

impl<V, C, A> DeterministicExpenseRuntime<V, C, A> {
    pub fn new(validator: V, categorizer: C, aggregator: A) -> Self {
        Self { validator, categorizer, aggregator }
    }
}

impl Default
    for DeterministicExpenseRuntime<PolicyValidator, KeywordCategorizer, SummaryAggregator>
{
    fn default() -> Self {
        Self::new(
            PolicyValidator::default(),
            KeywordCategorizer::default(),
            SummaryAggregator::default(),
        )
    }
}

impl<V, C, A> ExpenseRuntime for DeterministicExpenseRuntime<V, C, A>
where
    V: ValidationEngine,
    C: CategorizationEngine,
    A: AggregationEngine,
{
    fn validate_expense(&self, draft: &ExpenseDraft) -> ValidationResult {
        match draft.resolve() {
            Ok(record) => self.validator.validate(&record),
            Err(error) => ValidationResult::processing_failure(&error),
        }
    }

    fn categorize_expense(&self, draft: &ExpenseDraft) -> CategorizationResult {
        // Categorization only needs text and an amount; an unparseable
        // amount falls back to zero rather than failing the whole call.
        let amount = draft.amount.as_decimal().unwrap_or_default();
        self.categorizer.categorize(&CategorizationInput {
            description: draft.description.clone(),
            merchant: draft.merchant.clone().unwrap_or_default(),
            amount,
        })
    }

    fn summarize_expenses(&self, drafts: &[ExpenseDraft]) -> ExpenseSummary {
        self.aggregator.summarize(drafts)
    }
}
