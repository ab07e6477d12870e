//! Datastore row shapes
//!
//! Columns are snake_case. Reads are lenient: ids may be integers or UUIDs,
//! numeric columns may come back as numbers or strings, and any text column
//! may be null. Writes send exactly the columns the tables define.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{as_number, as_text};
use crate::models::{
    Budget, Document, NewBudget, NewDocument, NewPolicy, NewTransaction, PaymentFrequency,
    Policy, Transaction,
};

fn id_text(id: &Value) -> String {
    as_text(id).unwrap_or_default()
}

fn number_or_zero(value: &Value) -> f64 {
    as_number(value).unwrap_or(0.0)
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

// ========== Transactions ==========

#[derive(Debug, Deserialize)]
pub struct TransactionRow {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    amount: Value,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: id_text(&row.id),
            date: row.date.unwrap_or_default(),
            amount: number_or_zero(&row.amount),
            currency: row.currency.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            payment_method: row.payment_method.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            source: text_or(row.source, "Manual"),
            created_time: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionWrite<'a> {
    date: &'a str,
    amount: f64,
    currency: &'a str,
    category: &'a str,
    payment_method: &'a str,
    description: &'a str,
    source: &'a str,
}

impl<'a> From<&'a NewTransaction> for TransactionWrite<'a> {
    fn from(tx: &'a NewTransaction) -> Self {
        TransactionWrite {
            date: &tx.date,
            amount: tx.amount,
            currency: &tx.currency,
            category: &tx.category,
            payment_method: &tx.payment_method,
            description: &tx.description,
            source: &tx.source,
        }
    }
}

// ========== Budgets ==========

#[derive(Debug, Deserialize)]
pub struct BudgetRow {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    monthly_limit: Value,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<BudgetRow> for Budget {
    fn from(row: BudgetRow) -> Self {
        Budget {
            id: id_text(&row.id),
            category: row.category.unwrap_or_default(),
            monthly_limit: number_or_zero(&row.monthly_limit),
            created_time: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BudgetWrite<'a> {
    category: &'a str,
    monthly_limit: f64,
}

impl<'a> From<&'a NewBudget> for BudgetWrite<'a> {
    fn from(budget: &'a NewBudget) -> Self {
        BudgetWrite {
            category: &budget.category,
            monthly_limit: budget.monthly_limit,
        }
    }
}

// ========== Documents ==========

#[derive(Debug, Deserialize)]
pub struct DocumentRow {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    doc_type: Option<String>,
    #[serde(default)]
    expiration_date: Option<String>,
    #[serde(default)]
    document_number: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: id_text(&row.id),
            title: row.title.unwrap_or_default(),
            doc_type: row.doc_type.unwrap_or_default(),
            expiration_date: row.expiration_date.unwrap_or_default(),
            number: row.document_number.unwrap_or_default(),
            notes: row.notes.unwrap_or_default(),
            source: text_or(row.source, "Manual"),
            email: row.email.unwrap_or_default(),
            created_time: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentWrite<'a> {
    title: &'a str,
    doc_type: &'a str,
    expiration_date: &'a str,
    document_number: &'a str,
    notes: &'a str,
    source: &'a str,
    email: &'a str,
}

impl<'a> From<&'a NewDocument> for DocumentWrite<'a> {
    fn from(doc: &'a NewDocument) -> Self {
        DocumentWrite {
            title: &doc.title,
            doc_type: &doc.doc_type,
            expiration_date: &doc.expiration_date,
            document_number: &doc.number,
            notes: &doc.notes,
            source: &doc.source,
            email: &doc.email,
        }
    }
}

// ========== Policies ==========

#[derive(Debug, Deserialize)]
pub struct PolicyRow {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    policy_name: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    policy_type: Option<String>,
    #[serde(default)]
    policy_number: Option<String>,
    #[serde(default)]
    premium_amount: Value,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    payment_frequency: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    next_payment_date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<PolicyRow> for Policy {
    fn from(row: PolicyRow) -> Self {
        Policy {
            id: id_text(&row.id),
            policy_name: row.policy_name.unwrap_or_default(),
            provider: row.provider.unwrap_or_default(),
            policy_type: row.policy_type.unwrap_or_default(),
            policy_number: row.policy_number.unwrap_or_default(),
            premium_amount: number_or_zero(&row.premium_amount),
            currency: text_or(row.currency, "USD"),
            payment_frequency: PaymentFrequency::sanitize(row.payment_frequency.as_deref()),
            start_date: row.start_date.unwrap_or_default(),
            end_date: row.end_date.unwrap_or_default(),
            next_payment_date: row.next_payment_date.unwrap_or_default(),
            notes: row.notes.unwrap_or_default(),
            source: text_or(row.source, "Manual"),
            created_time: row.created_at,
        }
    }
}

/// Empty optional dates are written as null; date columns reject "".
#[derive(Debug, Serialize)]
pub struct PolicyWrite<'a> {
    policy_name: &'a str,
    provider: &'a str,
    policy_type: &'a str,
    policy_number: &'a str,
    premium_amount: f64,
    currency: &'a str,
    payment_frequency: &'static str,
    start_date: Option<&'a str>,
    end_date: Option<&'a str>,
    next_payment_date: &'a str,
    notes: &'a str,
    source: &'a str,
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl<'a> From<&'a NewPolicy> for PolicyWrite<'a> {
    fn from(policy: &'a NewPolicy) -> Self {
        PolicyWrite {
            policy_name: &policy.policy_name,
            provider: &policy.provider,
            policy_type: &policy.policy_type,
            policy_number: &policy.policy_number,
            premium_amount: policy.premium_amount,
            currency: &policy.currency,
            payment_frequency: policy.payment_frequency.as_str(),
            start_date: non_empty(&policy.start_date),
            end_date: non_empty(&policy.end_date),
            next_payment_date: &policy.next_payment_date,
            notes: &policy.notes,
            source: &policy.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_row_lenient() {
        let row: TransactionRow = serde_json::from_value(json!({
            "id": 42,
            "date": "2024-05-01",
            "amount": "19.99",
            "currency": null,
            "category": "Food",
            "payment_method": "UPI",
            "created_at": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap();
        let tx = Transaction::from(row);
        assert_eq!(tx.id, "42");
        assert_eq!(tx.amount, 19.99);
        assert_eq!(tx.currency, "");
        assert_eq!(tx.payment_method, "UPI");
        assert_eq!(tx.source, "Manual");
        assert_eq!(tx.created_time.as_deref(), Some("2024-05-01T10:00:00+00:00"));
    }

    #[test]
    fn test_document_row_maps_number_column() {
        let row: DocumentRow = serde_json::from_value(json!({
            "id": "7f1c",
            "title": "Passport",
            "doc_type": "passport",
            "expiration_date": "2030-01-01",
            "document_number": "X1"
        }))
        .unwrap();
        let doc = Document::from(row);
        assert_eq!(doc.id, "7f1c");
        assert_eq!(doc.number, "X1");
        assert_eq!(doc.email, "");
    }

    #[test]
    fn test_policy_row_defaults() {
        let row: PolicyRow = serde_json::from_value(json!({
            "id": 1,
            "policy_name": "Home",
            "payment_frequency": "weekly",
            "premium_amount": null
        }))
        .unwrap();
        let policy = Policy::from(row);
        assert_eq!(policy.currency, "USD");
        assert_eq!(policy.payment_frequency, PaymentFrequency::Monthly);
        assert_eq!(policy.premium_amount, 0.0);
        assert_eq!(policy.start_date, "");
    }

    #[test]
    fn test_policy_write_nulls_empty_dates() {
        let policy = NewPolicy {
            policy_name: "Car".into(),
            provider: "Acme".into(),
            policy_type: String::new(),
            policy_number: String::new(),
            premium_amount: 10.0,
            currency: "USD".into(),
            payment_frequency: PaymentFrequency::OneTime,
            start_date: String::new(),
            end_date: "2025-01-01".into(),
            next_payment_date: "2024-06-01".into(),
            notes: String::new(),
            source: "Manual".into(),
        };
        let json = serde_json::to_value(PolicyWrite::from(&policy)).unwrap();
        assert_eq!(json["start_date"], Value::Null);
        assert_eq!(json["end_date"], "2025-01-01");
        assert_eq!(json["payment_frequency"], "One-time");
    }

    #[test]
    fn test_document_write_columns() {
        let doc = NewDocument {
            title: "Visa".into(),
            doc_type: "visa".into(),
            expiration_date: "2026-02-01".into(),
            number: "V9".into(),
            notes: String::new(),
            source: "Manual".into(),
            email: String::new(),
        };
        let json = serde_json::to_value(DocumentWrite::from(&doc)).unwrap();
        assert_eq!(json["document_number"], "V9");
        assert!(json.get("number").is_none());
    }
}
