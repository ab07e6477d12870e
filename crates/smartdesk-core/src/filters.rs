//! List filtering for transactions, documents and policies
//!
//! Filtering happens after the datastore returns the full list. Query
//! strings are parsed here so malformed input is rejected before any
//! datastore call.

use chrono::NaiveDate;

use crate::dates::{add_months, parse_date};
use crate::error::{Error, Result};
use crate::models::{Document, Policy, Transaction};

/// Parse an optional `YYYY-MM-DD` query parameter. Blank counts as absent.
pub fn parse_query_date(value: Option<&str>, label: &str) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, crate::dates::DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                Error::BadRequest(format!("Invalid {} date format (use YYYY-MM-DD)", label))
            }),
    }
}

/// Inclusive date range plus optional category for transaction lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<String>,
}

impl TransactionFilter {
    /// Build from raw query parameters
    pub fn from_query(
        from: Option<&str>,
        to: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            from: parse_query_date(from, "from")?,
            to: parse_query_date(to, "to")?,
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.category.is_none()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = parse_date(&tx.date) else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        match &self.category {
            Some(category) => tx.category.eq_ignore_ascii_case(category),
            None => true,
        }
    }

    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        if self.is_empty() {
            return transactions;
        }
        transactions.into_iter().filter(|tx| self.matches(tx)).collect()
    }
}

/// `?months=N&upcoming=true` window for documents and policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryWindow {
    pub months: Option<u32>,
    pub upcoming_only: bool,
}

impl ExpiryWindow {
    /// Build from raw query parameters. Only the literal `true` enables
    /// `upcoming`; `months` must be a non-negative integer.
    pub fn from_query(months: Option<&str>, upcoming: Option<&str>) -> Result<Self> {
        let months = match months.map(str::trim).filter(|m| !m.is_empty()) {
            None => None,
            Some(m) => Some(m.parse::<u32>().map_err(|_| {
                Error::BadRequest("months must be a non-negative integer".to_string())
            })?),
        };
        Ok(Self {
            months,
            upcoming_only: upcoming == Some("true"),
        })
    }

    /// No filtering requested
    pub fn is_unbounded(&self) -> bool {
        self.months.is_none() && !self.upcoming_only
    }

    /// Documents expiring today, or after today and strictly before
    /// `today + N months`. N falls back to `default_months`.
    pub fn filter_documents(
        &self,
        documents: Vec<Document>,
        default_months: u32,
        today: NaiveDate,
    ) -> Vec<Document> {
        if self.is_unbounded() {
            return documents;
        }
        let until = add_months(today, self.months.unwrap_or(default_months));
        documents
            .into_iter()
            .filter(|doc| {
                parse_date(&doc.expiration_date)
                    .is_some_and(|exp| exp == today || (exp > today && exp < until))
            })
            .collect()
    }

    /// Policies due today or later; capped at `today + N months` (inclusive)
    /// only when `months` was given.
    pub fn filter_policies(&self, policies: Vec<Policy>, today: NaiveDate) -> Vec<Policy> {
        if self.is_unbounded() {
            return policies;
        }
        let until = self.months.map(|m| add_months(today, m));
        policies
            .into_iter()
            .filter(|policy| {
                parse_date(&policy.next_payment_date).is_some_and(|due| {
                    due >= today && until.map_or(true, |until| due <= until)
                })
            })
            .collect()
    }
}
