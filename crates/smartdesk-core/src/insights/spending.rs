//! Spending summary over a list of transactions

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dates::parse_date;
use crate::models::{CategoryTotal, DailyTotal, InsightSummary, Transaction};

use super::{UNCATEGORIZED, UNDATED};

/// Sums keyed by string, remembering first-seen order
#[derive(Default)]
struct OrderedTotals {
    index: HashMap<String, usize>,
    totals: Vec<(String, f64)>,
}

impl OrderedTotals {
    fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&i) => self.totals[i].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.totals.len());
                self.totals.push((key.to_string(), amount));
            }
        }
    }
}

fn key_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Compute the dashboard summary.
///
/// Category breakdown is sorted by amount descending (ties keep first-seen
/// order). The trend is sorted by date ascending; keys that do not parse as
/// dates, including "Unknown", follow in first-seen order.
pub fn compute_insights(transactions: &[Transaction]) -> InsightSummary {
    let mut by_category = OrderedTotals::default();
    let mut by_date = OrderedTotals::default();
    let mut total = 0.0;

    for tx in transactions {
        let amount = if tx.amount.is_finite() { tx.amount } else { 0.0 };
        total += amount;
        by_category.add(key_or(&tx.category, UNCATEGORIZED), amount);
        by_date.add(key_or(&tx.date, UNDATED), amount);
    }

    let mut category_breakdown: Vec<CategoryTotal> = by_category
        .totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    category_breakdown.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));

    let mut trend: Vec<(Option<chrono::NaiveDate>, DailyTotal)> = by_date
        .totals
        .into_iter()
        .map(|(date, amount)| (parse_date(&date), DailyTotal { date, amount }))
        .collect();
    trend.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    let trend: Vec<DailyTotal> = trend.into_iter().map(|(_, day)| day).collect();

    let days = trend.len().max(1) as f64;
    let top_category = category_breakdown
        .first()
        .cloned()
        .unwrap_or_else(|| CategoryTotal {
            category: "N/A".to_string(),
            amount: 0.0,
        });

    InsightSummary {
        total_spent: total,
        average_daily: total / days,
        top_category,
        category_breakdown,
        trend,
        count: transactions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, category: &str, amount: f64) -> Transaction {
        Transaction {
            id: String::new(),
            date: date.to_string(),
            amount,
            currency: "USD".into(),
            category: category.to_string(),
            payment_method: "Cash".into(),
            description: String::new(),
            source: "Manual".into(),
            created_time: None,
        }
    }

    #[test]
    fn test_compute_insights_basic() {
        let summary = compute_insights(&[
            tx("2024-01-01", "Food", 10.0),
            tx("2024-01-01", "Rent", 500.0),
            tx("2024-01-02", "Food", 20.0),
        ]);
        assert_eq!(summary.total_spent, 530.0);
        assert_eq!(summary.average_daily, 265.0);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.top_category.category, "Rent");
        assert_eq!(summary.category_breakdown[1].category, "Food");
        assert_eq!(summary.category_breakdown[1].amount, 30.0);
        assert_eq!(summary.trend.len(), 2);
        assert_eq!(summary.trend[0].date, "2024-01-01");
        assert_eq!(summary.trend[0].amount, 510.0);
    }

    #[test]
    fn test_breakdown_and_trend_sum_to_total() {
        let summary = compute_insights(&[
            tx("2024-03-02", "Food", 12.25),
            tx("2024-03-01", "Travel", 80.0),
            tx("2024-03-02", "Food", 7.75),
            tx("", "", 3.5),
            tx("2024-03-05", "Health", 41.0),
        ]);
        let by_category: f64 = summary.category_breakdown.iter().map(|c| c.amount).sum();
        let by_day: f64 = summary.trend.iter().map(|d| d.amount).sum();
        assert!((by_category - summary.total_spent).abs() < 1e-9);
        assert!((by_day - summary.total_spent).abs() < 1e-9);
        assert_eq!(summary.total_spent, 144.5);
    }

    #[test]
    fn test_compute_insights_empty() {
        let summary = compute_insights(&[]);
        assert_eq!(summary.total_spent, 0.0);
        assert_eq!(summary.average_daily, 0.0);
        assert_eq!(summary.top_category.category, "N/A");
        assert!(summary.category_breakdown.is_empty());
        assert!(summary.trend.is_empty());
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_missing_keys_grouped() {
        let summary = compute_insights(&[tx("", "", 5.0), tx("2024-03-01", "Food", 1.0)]);
        assert_eq!(summary.top_category.category, "Other");
        assert_eq!(summary.trend[0].date, "2024-03-01");
        assert_eq!(summary.trend[1].date, "Unknown");
    }

    #[test]
    fn test_trend_sorted_with_unparseable_last() {
        let summary = compute_insights(&[
            tx("2024-02-01", "Food", 1.0),
            tx("garbage", "Food", 1.0),
            tx("2024-01-01", "Food", 1.0),
            tx("", "Food", 1.0),
        ]);
        let dates: Vec<_> = summary.trend.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-02-01", "garbage", "Unknown"]);
    }

    #[test]
    fn test_breakdown_ties_keep_first_seen() {
        let summary = compute_insights(&[
            tx("2024-01-01", "Travel", 5.0),
            tx("2024-01-01", "Food", 5.0),
        ]);
        assert_eq!(summary.top_category.category, "Travel");
    }
}
