//! Policy renewal summary

use chrono::{Duration, NaiveDate};

use crate::dates::parse_date;
use crate::models::{NextPayment, Policy, PolicyInsights};

/// Horizon for the "due soon" list
pub const DUE_SOON_DAYS: i64 = 30;

/// Summarise policies relative to `today`.
///
/// `next_payment` is the earliest valid due date, past or future. Due soon
/// means `today <= due <= today + 30 days`. Policies without a parseable due
/// date count toward `total` only.
pub fn policy_insights(policies: &[Policy], today: NaiveDate) -> PolicyInsights {
    let mut dated: Vec<(NaiveDate, &Policy)> = policies
        .iter()
        .filter_map(|p| parse_date(&p.next_payment_date).map(|d| (d, p)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let next_payment = dated.first().map(|(_, p)| NextPayment {
        policy_name: p.policy_name.clone(),
        provider: p.provider.clone(),
        amount: p.premium_amount,
        currency: p.currency.clone(),
        payment_frequency: p.payment_frequency,
        date: p.next_payment_date.clone(),
    });

    let horizon = today + Duration::days(DUE_SOON_DAYS);
    let due_soon: Vec<Policy> = dated
        .iter()
        .filter(|(date, _)| *date >= today && *date <= horizon)
        .map(|(_, p)| (*p).clone())
        .collect();

    PolicyInsights {
        total: policies.len(),
        next_payment,
        due_soon_count: due_soon.len(),
        due_soon,
    }
}
