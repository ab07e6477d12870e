//! Budget consumption for the current month

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dates::{format_date, month_bounds, parse_date};
use crate::models::{Budget, BudgetStatus, Transaction};

use super::UNCATEGORIZED;

/// Attach current-month spend to each budget.
///
/// Transactions are matched to budgets by exact, case-sensitive category.
/// Budget categories are stored as typed while transaction categories are
/// canonicalised, so a budget saved as "food" never sees "Food" spend.
pub fn budget_statuses(
    budgets: &[Budget],
    transactions: &[Transaction],
    today: NaiveDate,
) -> Vec<BudgetStatus> {
    let (start, end) = month_bounds(today);

    let mut spent_by_category: HashMap<&str, f64> = HashMap::new();
    for tx in transactions {
        let Some(date) = parse_date(&tx.date) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        let key = if tx.category.is_empty() {
            UNCATEGORIZED
        } else {
            tx.category.as_str()
        };
        let amount = if tx.amount.is_finite() { tx.amount } else { 0.0 };
        *spent_by_category.entry(key).or_insert(0.0) += amount;
    }

    let period = format!("{} → {}", format_date(start), format_date(end));

    budgets
        .iter()
        .map(|budget| {
            let spent = spent_by_category
                .get(budget.category.as_str())
                .copied()
                .unwrap_or(0.0);
            let limit = budget.monthly_limit;
            let percent_used = if limit > 0.0 {
                (spent / limit * 100.0).min(100.0)
            } else {
                0.0
            };
            BudgetStatus {
                budget: budget.clone(),
                spent,
                remaining: (limit - spent).max(0.0),
                percent_used,
                period: period.clone(),
            }
        })
        .collect()
}
