use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use expenso_core::{AmountField, ExpenseDraft, ExpenseRuntime};

use crate::search::PolicySearch;

pub const TOOL_SEARCH_POLICY: &str = "search_expense_policy";
pub const TOOL_VALIDATE_EXPENSE: &str = "validate_expense_data";
pub const TOOL_CATEGORIZE_EXPENSE: &str = "categorize_expense";
pub const TOOL_EXPENSE_SUMMARY: &str = "generate_expense_summary";

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Executes the tool. Bad input degrades into a diagnostic payload;
    /// `Err` is reserved for faults the caller cannot express as data.
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn dispatch(&self, name: &str, input: Value) -> Result<Value> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(input).await,
            None => bail!("unknown tool `{name}`"),
        }
    }
}

/// Searches the expense policy knowledge base.
pub struct SearchPolicyTool {
    search: Arc<dyn PolicySearch>,
}

impl SearchPolicyTool {
    pub fn new(search: Arc<dyn PolicySearch>) -> Self {
        Self { search }
    }
}

#[derive(Deserialize)]
struct SearchPolicyInput {
    #[serde(default)]
    query: String,
    #[serde(default)]
    category: Option<String>,
}

#[async_trait]
impl Tool for SearchPolicyTool {
    fn name(&self) -> &'static str {
        TOOL_SEARCH_POLICY
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: SearchPolicyInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(err) => return Ok(search_error_payload(&err.to_string())),
        };

        match self.search.search(&input.query, input.category.as_deref()).await {
            Ok(results) => {
                let mut payload = serde_json::to_value(results)?;
                if let Some(object) = payload.as_object_mut() {
                    object.insert("status".to_string(), json!("success"));
                }
                Ok(payload)
            }
            Err(err) => Ok(search_error_payload(&err.to_string())),
        }
    }
}

fn search_error_payload(message: &str) -> Value {
    json!({
        "status": "error",
        "message": format!("Error searching policy database: {message}"),
        "policy_excerpts": [],
        "sources": [],
    })
}

/// Validates one expense against the policy rules.
pub struct ValidateExpenseTool {
    runtime: Arc<dyn ExpenseRuntime>,
}

impl ValidateExpenseTool {
    pub fn new(runtime: Arc<dyn ExpenseRuntime>) -> Self {
        Self { runtime }
    }
}

#[derive(Deserialize)]
struct ValidateExpenseInput {
    expense_data: ExpenseDraft,
}

#[async_trait]
impl Tool for ValidateExpenseTool {
    fn name(&self) -> &'static str {
        TOOL_VALIDATE_EXPENSE
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: ValidateExpenseInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(err) => return Ok(validation_error_payload(&err.to_string())),
        };

        let result = self.runtime.validate_expense(&input.expense_data);
        Ok(serde_json::to_value(result)?)
    }
}

fn validation_error_payload(message: &str) -> Value {
    json!({
        "is_valid": false,
        "violations": [format!("Error validating expense data: {message}")],
        "warnings": [],
        "required_documents": [],
        "policy_references": [],
    })
}

/// Suggests a category, subcategory, and confidence for one expense.
pub struct CategorizeExpenseTool {
    runtime: Arc<dyn ExpenseRuntime>,
}

impl CategorizeExpenseTool {
    pub fn new(runtime: Arc<dyn ExpenseRuntime>) -> Self {
        Self { runtime }
    }
}

#[derive(Deserialize)]
struct CategorizeExpenseInput {
    #[serde(default)]
    description: String,
    #[serde(default)]
    merchant: String,
    #[serde(default)]
    amount: AmountField,
}

#[async_trait]
impl Tool for CategorizeExpenseTool {
    fn name(&self) -> &'static str {
        TOOL_CATEGORIZE_EXPENSE
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: CategorizeExpenseInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(err) => {
                return Ok(json!({
                    "status": "error",
                    "message": format!("Error categorizing expense: {err}"),
                }))
            }
        };

        let draft = ExpenseDraft {
            amount: input.amount,
            description: input.description,
            merchant: Some(input.merchant),
            ..ExpenseDraft::default()
        };
        let result = self.runtime.categorize_expense(&draft);
        Ok(serde_json::to_value(result)?)
    }
}

/// Builds a batch summary over a list of expenses.
pub struct ExpenseSummaryTool {
    runtime: Arc<dyn ExpenseRuntime>,
}

impl ExpenseSummaryTool {
    pub fn new(runtime: Arc<dyn ExpenseRuntime>) -> Self {
        Self { runtime }
    }
}

#[derive(Deserialize)]
struct ExpenseSummaryInput {
    #[serde(default)]
    expenses: Vec<ExpenseDraft>,
}

#[async_trait]
impl Tool for ExpenseSummaryTool {
    fn name(&self) -> &'static str {
        TOOL_EXPENSE_SUMMARY
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: ExpenseSummaryInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(err) => {
                return Ok(json!({
                    "status": "error",
                    "message": format!("Error generating expense summary: {err}"),
                }))
            }
        };

        let summary = self.runtime.summarize_expenses(&input.expenses);
        Ok(serde_json::to_value(summary)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use expenso_core::DeterministicExpenseRuntime;

    use crate::search::StaticPolicySearch;

    use super::{
        CategorizeExpenseTool, ExpenseSummaryTool, SearchPolicyTool, ToolRegistry,
        ValidateExpenseTool, TOOL_CATEGORIZE_EXPENSE, TOOL_EXPENSE_SUMMARY, TOOL_SEARCH_POLICY,
        TOOL_VALIDATE_EXPENSE,
    };

    fn registry() -> ToolRegistry {
        let runtime = Arc::new(DeterministicExpenseRuntime::default());
        let mut registry = ToolRegistry::default();
        registry.register(SearchPolicyTool::new(Arc::new(StaticPolicySearch)));
        registry.register(ValidateExpenseTool::new(runtime.clone()));
        registry.register(CategorizeExpenseTool::new(runtime.clone()));
        registry.register(ExpenseSummaryTool::new(runtime));
        registry
    }

    #[tokio::test]
    async fn registry_lists_all_four_tools() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec![
                TOOL_CATEGORIZE_EXPENSE,
                TOOL_EXPENSE_SUMMARY,
                TOOL_SEARCH_POLICY,
                TOOL_VALIDATE_EXPENSE,
            ],
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_a_dispatch_error() {
        let registry = registry();
        let error = registry
            .dispatch("approve_reimbursement", json!({}))
            .await
            .expect_err("unknown tool should fail");
        assert!(error.to_string().contains("approve_reimbursement"));
    }

    #[tokio::test]
    async fn validate_tool_flags_meal_over_limit() {
        let registry = registry();
        let result = registry
            .dispatch(
                TOOL_VALIDATE_EXPENSE,
                json!({"expense_data": {"amount": 120.0, "category": "meals", "has_receipt": true}}),
            )
            .await
            .expect("dispatch");

        assert_eq!(result["is_valid"], json!(false));
        assert!(result["violations"][0]
            .as_str()
            .is_some_and(|violation| violation.contains("daily policy limit")));
    }

    #[tokio::test]
    async fn validate_tool_turns_bad_amounts_into_diagnostics() {
        let registry = registry();
        let result = registry
            .dispatch(
                TOOL_VALIDATE_EXPENSE,
                json!({"expense_data": {"amount": "fourteen", "category": "meals"}}),
            )
            .await
            .expect("dispatch");

        assert_eq!(result["is_valid"], json!(false));
        assert!(result["violations"][0]
            .as_str()
            .is_some_and(|violation| violation.starts_with("Error validating expense data:")));
    }

    #[tokio::test]
    async fn categorize_tool_reads_description_and_merchant() {
        let registry = registry();
        let result = registry
            .dispatch(
                TOOL_CATEGORIZE_EXPENSE,
                json!({"description": "team stay", "merchant": "Hilton Garden", "amount": 240.0}),
            )
            .await
            .expect("dispatch");

        assert_eq!(result["category"], json!("lodging"));
    }

    #[tokio::test]
    async fn summary_tool_isolates_broken_records() {
        let registry = registry();
        let result = registry
            .dispatch(
                TOOL_EXPENSE_SUMMARY,
                json!({"expenses": [
                    {"amount": 40.0, "category": "meals", "has_receipt": true},
                    {"amount": "ten-ish", "category": "meals"},
                ]}),
            )
            .await
            .expect("dispatch");

        assert_eq!(result["expense_count"], json!(2));
        assert_eq!(result["compliance_status"]["ready_for_submission"], json!(false));
        assert!(result["compliance_status"]["violations"][0]
            .as_str()
            .is_some_and(|violation| violation.contains("Error processing expense")));
    }

    #[tokio::test]
    async fn search_tool_reports_success_status() {
        let registry = registry();
        let result = registry
            .dispatch(TOOL_SEARCH_POLICY, json!({"query": "hotel nightly limit"}))
            .await
            .expect("dispatch");

        assert_eq!(result["status"], json!("success"));
        assert!(result["total_results"].as_u64().is_some_and(|count| count > 0));
    }
}
