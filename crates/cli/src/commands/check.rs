use std::fs;
use std::path::Path;

use expenso_core::domain::expense::ExpenseDraft;
use expenso_core::engine::aggregator::ExpenseSummary;
use expenso_core::engine::{DeterministicExpenseRuntime, ExpenseEvaluation, ExpenseRuntime};
use serde::{Deserialize, Serialize};

use crate::commands::CommandResult;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckInput {
    Wrapped { expenses: Vec<ExpenseDraft> },
    Bare(Vec<ExpenseDraft>),
}

#[derive(Debug, Serialize)]
struct CheckEntry {
    position: usize,
    #[serde(flatten)]
    evaluation: ExpenseEvaluation,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    command: &'static str,
    status: &'static str,
    file: String,
    total_expenses: usize,
    invalid_expenses: usize,
    expenses: Vec<CheckEntry>,
    summary: ExpenseSummary,
}

/// Offline batch check: validates and categorizes every expense in a JSON
/// file and appends the aggregate summary. Exit code 1 signals that at
/// least one expense has a policy violation.
pub fn run(file: &Path) -> CommandResult {
    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "file_read",
                format!("could not read `{}`: {error}", file.display()),
                2,
            );
        }
    };

    let drafts = match serde_json::from_str::<CheckInput>(&raw) {
        Ok(CheckInput::Wrapped { expenses }) | Ok(CheckInput::Bare(expenses)) => expenses,
        Err(error) => {
            return CommandResult::failure(
                "check",
                "invalid_input",
                format!("could not parse `{}` as an expense list: {error}", file.display()),
                3,
            );
        }
    };

    let runtime = DeterministicExpenseRuntime::default();
    let expenses: Vec<CheckEntry> = drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| CheckEntry {
            position: index + 1,
            evaluation: runtime.evaluate_expense(draft),
        })
        .collect();

    let invalid_expenses =
        expenses.iter().filter(|entry| !entry.evaluation.validation.is_valid).count();
    let summary = runtime.summarize_expenses(&drafts);

    let report = CheckReport {
        command: "check",
        status: if invalid_expenses == 0 { "ok" } else { "violations" },
        file: file.display().to_string(),
        total_expenses: drafts.len(),
        invalid_expenses,
        expenses,
        summary,
    };

    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"check\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    let exit_code = if invalid_expenses == 0 { 0 } else { 1 };
    CommandResult { exit_code, output }
}
