pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;

pub use domain::expense::{parse_expense_date, AmountField, ExpenseDraft, ExpenseRecord};
pub use domain::session::{Session, SessionEvent, SessionEventKind, SessionId};
pub use engine::aggregator::{
    AggregationEngine, CategoryBucket, CategoryExpense, ComplianceStatus, DateRange,
    ExpenseSummary, Statistics, SummaryAggregator,
};
pub use engine::categorizer::{
    CategorizationEngine, CategorizationInput, CategorizationResult, CategoryScore,
    KeywordCategorizer,
};
pub use engine::rules::PolicyLimits;
pub use engine::validator::{PolicyValidator, ValidationEngine, ValidationResult};
pub use engine::{DeterministicExpenseRuntime, ExpenseEvaluation, ExpenseRuntime};
pub use errors::DomainError;
