use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::expense::{parse_expense_date, ExpenseDraft};

use super::rules::{PolicyLimits, CATEGORY_FALLBACK};
use super::validator::validate_record;

/// One expense as it appears inside a category bucket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpense {
    pub amount: Decimal,
    pub description: String,
    pub date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub count: usize,
    pub total: Decimal,
    pub average: Decimal,
    pub expenses: Vec<CategoryExpense>,
}

/// Compliance verdict over the whole batch. `ready_for_submission` is false
/// iff any record failed validation or failed to process at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplianceStatus {
    pub total_violations: usize,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
    pub ready_for_submission: bool,
}

impl Default for ComplianceStatus {
    fn default() -> Self {
        Self {
            total_violations: 0,
            violations: Vec::new(),
            warnings: Vec::new(),
            ready_for_submission: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
    pub duration_days: i64,
}

/// Batch statistics over the records that resolved. Absent when none did.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub average_expense: Decimal,
    pub largest_expense: Decimal,
    pub smallest_expense: Decimal,
    pub most_common_category: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total_amount: Decimal,
    pub expense_count: usize,
    pub categories: BTreeMap<String, CategoryBucket>,
    pub compliance_status: ComplianceStatus,
    pub required_documents: Vec<String>,
    pub policy_references: Vec<String>,
    pub date_range: Option<DateRange>,
    pub statistics: Option<Statistics>,
}

pub trait AggregationEngine: Send + Sync {
    fn summarize(&self, drafts: &[ExpenseDraft]) -> ExpenseSummary;
}

#[derive(Clone, Debug, Default)]
pub struct SummaryAggregator {
    limits: PolicyLimits,
}

impl SummaryAggregator {
    pub fn new(limits: PolicyLimits) -> Self {
        Self { limits }
    }
}

impl AggregationEngine for SummaryAggregator {
    fn summarize(&self, drafts: &[ExpenseDraft]) -> ExpenseSummary {
        summarize_drafts(drafts, &self.limits)
    }
}

/// Builds a batch summary in one pass. A record that fails to resolve is
/// isolated: it is reported as a violation tagged with its 1-based position
/// and flips `ready_for_submission`, while every other record still
/// contributes to the totals.
pub fn summarize_drafts(drafts: &[ExpenseDraft], limits: &PolicyLimits) -> ExpenseSummary {
    let mut summary = ExpenseSummary { expense_count: drafts.len(), ..ExpenseSummary::default() };
    // First-appearance order, for the most-common tie break.
    let mut category_order: Vec<String> = Vec::new();
    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut documents: BTreeSet<String> = BTreeSet::new();
    let mut references: BTreeSet<String> = BTreeSet::new();
    let mut resolved: Vec<Decimal> = Vec::new();

    for (index, draft) in drafts.iter().enumerate() {
        let position = index + 1;

        let record = match draft.resolve() {
            Ok(record) => record,
            Err(error) => {
                summary
                    .compliance_status
                    .violations
                    .push(format!("Expense #{position}: Error processing expense - {error}"));
                summary.compliance_status.ready_for_submission = false;
                continue;
            }
        };

        summary.total_amount += record.amount;
        resolved.push(record.amount);

        let category = match record.category.trim() {
            "" => CATEGORY_FALLBACK.to_string(),
            name => name.to_lowercase(),
        };
        if !summary.categories.contains_key(&category) {
            category_order.push(category.clone());
        }
        let bucket = summary.categories.entry(category).or_default();
        bucket.count += 1;
        bucket.total += record.amount;
        bucket.expenses.push(CategoryExpense {
            amount: record.amount,
            description: record.description.clone(),
            date: record.date.clone(),
        });

        let validation = validate_record(&record, limits);
        if !validation.is_valid {
            summary.compliance_status.total_violations += validation.violations.len();
            for violation in validation.violations {
                summary
                    .compliance_status
                    .violations
                    .push(format!("Expense #{position}: {violation}"));
            }
            summary.compliance_status.ready_for_submission = false;
        }
        for warning in validation.warnings {
            summary.compliance_status.warnings.push(format!("Expense #{position}: {warning}"));
        }
        documents.extend(validation.required_documents);
        references.extend(validation.policy_references);

        if let Some(date) = record.date.as_deref().and_then(parse_expense_date) {
            dates.push(date);
        }
    }

    summary.total_amount = summary.total_amount.round_dp(2);
    for bucket in summary.categories.values_mut() {
        if bucket.count > 0 {
            bucket.average = (bucket.total / Decimal::from(bucket.count)).round_dp(2);
        }
    }
    summary.required_documents = documents.into_iter().collect();
    summary.policy_references = references.into_iter().collect();
    summary.date_range = date_range(&dates);
    summary.statistics = statistics(&resolved, &summary, &category_order);

    summary
}

fn date_range(dates: &[NaiveDate]) -> Option<DateRange> {
    let start = dates.iter().min()?;
    let end = dates.iter().max()?;

    // Inclusive day count: a single date, or several equal ones, spans one
    // day.
    let duration_days =
        if dates.len() > 1 { (*end - *start).num_days() + 1 } else { 1 };

    Some(DateRange {
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
        duration_days,
    })
}

fn statistics(
    resolved: &[Decimal],
    summary: &ExpenseSummary,
    category_order: &[String],
) -> Option<Statistics> {
    let largest = *resolved.iter().max()?;
    let smallest = *resolved.iter().min()?;
    let average =
        (summary.total_amount / Decimal::from(resolved.len())).round_dp(2);

    Some(Statistics {
        average_expense: average,
        largest_expense: largest,
        smallest_expense: smallest,
        most_common_category: most_common_category(&summary.categories, category_order)?,
    })
}

/// The category with the highest count; ties go to the category that
/// appeared first in the batch.
fn most_common_category(
    categories: &BTreeMap<String, CategoryBucket>,
    order: &[String],
) -> Option<String> {
    let mut winner: Option<(&str, usize)> = None;
    for name in order {
        let count = categories.get(name).map_or(0, |bucket| bucket.count);
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((name, count));
        }
    }
    winner.map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::expense::{AmountField, ExpenseDraft};
    use crate::engine::rules::PolicyLimits;

    use super::summarize_drafts;

    fn draft(amount: f64, category: &str, date: Option<&str>) -> ExpenseDraft {
        ExpenseDraft {
            amount: AmountField::Number(amount),
            category: category.to_string(),
            description: format!("{category} expense"),
            date: date.map(str::to_string),
            has_receipt: true,
            ..ExpenseDraft::default()
        }
    }

    #[test]
    fn empty_batch_produces_an_empty_summary() {
        let summary = summarize_drafts(&[], &PolicyLimits::default());

        assert_eq!(summary.expense_count, 0);
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert!(summary.categories.is_empty());
        assert!(summary.compliance_status.ready_for_submission);
        assert_eq!(summary.date_range, None);
        assert_eq!(summary.statistics, None);
    }

    #[test]
    fn totals_buckets_and_statistics_accumulate_per_category() {
        let drafts = vec![
            draft(40.0, "meals", Some("2026-03-02")),
            draft(35.5, "meals", Some("2026-03-03")),
            draft(220.0, "lodging", Some("2026-03-01")),
        ];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());

        assert_eq!(summary.expense_count, 3);
        assert_eq!(summary.total_amount, Decimal::new(2955, 1));

        let meals = &summary.categories["meals"];
        assert_eq!(meals.count, 2);
        assert_eq!(meals.total, Decimal::new(755, 1));
        assert_eq!(meals.average, Decimal::new(3775, 2));
        assert_eq!(meals.expenses.len(), 2);
        assert_eq!(meals.expenses[0].date.as_deref(), Some("2026-03-02"));
        assert_eq!(summary.categories["lodging"].count, 1);

        let stats = summary.statistics.expect("statistics for a resolved batch");
        assert_eq!(stats.largest_expense, Decimal::new(220, 0));
        assert_eq!(stats.smallest_expense, Decimal::new(355, 1));
        assert_eq!(stats.average_expense, Decimal::new(985, 1));
        assert_eq!(stats.most_common_category, "meals");

        let range = summary.date_range.expect("range from three dated expenses");
        assert_eq!(range.start_date, "2026-03-01");
        assert_eq!(range.end_date, "2026-03-03");
        assert_eq!(range.duration_days, 3);
    }

    #[test]
    fn violations_and_warnings_are_tagged_with_their_batch_position() {
        let mut justified = draft(60.0, "meals", None);
        justified.description = "dinner at the hotel".to_string();
        let drafts = vec![justified, draft(150.0, "meals", None), draft(400.0, "lodging", None)];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());
        let compliance = &summary.compliance_status;

        assert_eq!(compliance.total_violations, 2);
        assert!(!compliance.ready_for_submission);
        assert!(compliance.violations[0].starts_with("Expense #2:"));
        assert!(compliance.violations[1].starts_with("Expense #3:"));
        assert!(compliance.warnings[0].starts_with("Expense #1:"));
    }

    #[test]
    fn documents_and_references_are_deduplicated() {
        let mut first = draft(80.0, "meals", None);
        first.has_receipt = false;
        let mut second = draft(90.0, "meals", None);
        second.has_receipt = false;

        let summary = summarize_drafts(&[first, second], &PolicyLimits::default());

        // Both records require the same receipt documents and cite the same
        // section; each appears once.
        assert_eq!(summary.required_documents.len(), 2);
        assert_eq!(summary.policy_references.len(), 1);
        assert!(summary.policy_references[0].contains("Section 2.1"));
    }

    #[test]
    fn failed_record_is_isolated_from_the_rest_of_the_batch() {
        let mut broken = draft(0.0, "meals", None);
        broken.amount = AmountField::Text("ten-ish".to_string());
        let drafts = vec![draft(40.0, "meals", Some("2026-03-02")), broken];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());

        // The broken record still counts as submitted, but contributes
        // nothing to the totals or statistics.
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.total_amount, Decimal::new(40, 0));
        assert_eq!(summary.categories["meals"].count, 1);
        assert_eq!(summary.statistics.expect("one resolved record").largest_expense, Decimal::new(40, 0));

        let compliance = &summary.compliance_status;
        assert!(!compliance.ready_for_submission);
        assert_eq!(compliance.violations.len(), 1);
        assert!(compliance.violations[0].contains("Error processing expense"));
        // Processing failures are reported but not counted as policy
        // violations.
        assert_eq!(compliance.total_violations, 0);
    }

    #[test]
    fn most_common_category_tie_goes_to_first_appearance() {
        let drafts = vec![
            draft(20.0, "transportation", None),
            draft(30.0, "meals", None),
            draft(25.0, "meals", None),
            draft(15.0, "transportation", None),
        ];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());
        let stats = summary.statistics.expect("statistics");
        assert_eq!(stats.most_common_category, "transportation");
    }

    #[test]
    fn blank_category_buckets_under_the_fallback_name() {
        let drafts = vec![draft(12.0, "", None), draft(8.0, "  ", None)];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());

        assert_eq!(summary.categories["miscellaneous"].count, 2);
    }

    #[test]
    fn undated_and_misdated_expenses_leave_the_range_empty() {
        let drafts = vec![draft(12.0, "meals", None), draft(8.0, "meals", Some("sometime in May"))];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());
        assert_eq!(summary.date_range, None);
    }

    #[test]
    fn single_date_spans_one_day() {
        let drafts = vec![draft(12.0, "meals", Some("2026-03-02"))];

        let range = summarize_drafts(&drafts, &PolicyLimits::default())
            .date_range
            .expect("range from one dated expense");
        assert_eq!(range.start_date, range.end_date);
        assert_eq!(range.duration_days, 1);
    }

    #[test]
    fn total_amount_rounds_to_cents() {
        let drafts = vec![draft(10.111, "meals", None), draft(10.111, "meals", None)];

        let summary = summarize_drafts(&drafts, &PolicyLimits::default());
        assert_eq!(summary.total_amount, Decimal::new(2022, 2));
    }

    #[test]
    fn summary_is_order_insensitive_up_to_position_tags() {
        let forward = vec![draft(50.0, "meals", None), draft(400.0, "lodging", None)];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        let first = summarize_drafts(&forward, &PolicyLimits::default());
        let second = summarize_drafts(&reversed, &PolicyLimits::default());

        assert_eq!(first.total_amount, Decimal::new(450, 0));
        assert_eq!(first.total_amount, second.total_amount);
        assert_eq!(first.categories.len(), 2);
        assert_eq!(first.categories["meals"].count, 1);
        assert_eq!(first.categories["lodging"].count, 1);
        assert_eq!(first.categories, second.categories);
        assert_eq!(
            first.compliance_status.ready_for_submission,
            second.compliance_status.ready_for_submission,
        );
        assert!(!first.compliance_status.ready_for_submission);
    }
}
