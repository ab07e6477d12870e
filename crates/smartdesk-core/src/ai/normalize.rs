//! Turn recovered model JSON into candidate records
//!
//! Models answer with arrays, wrapper objects, or a single bare object, and
//! use whatever key names they like. Each entity has a rule table of aliases
//! and defaults; candidates with nothing useful in them are dropped.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::Value;

use crate::fields::{Fallback, FieldRule};
use crate::models::{NewDocument, NewPolicy, NewTransaction, PaymentFrequency, Source};

mod transaction {
    use super::*;

    pub const DATE: FieldRule = FieldRule::new("date", Fallback::Today);
    pub const AMOUNT: FieldRule = FieldRule::new("amount", Fallback::Zero);
    pub const CURRENCY: FieldRule = FieldRule::new("currency", Fallback::Text("USD"));
    pub const CATEGORY: FieldRule = FieldRule::new("category", Fallback::Text("Other"));
    pub const PAYMENT_METHOD: FieldRule =
        FieldRule::new("paymentMethod", Fallback::Text("Other"));
    pub const DESCRIPTION: FieldRule = FieldRule::new("description", Fallback::Empty);
    /// Notes usually name the merchant rather than describe the purchase
    pub const NOTE_DESCRIPTION: FieldRule =
        FieldRule::with_aliases("description", &["merchant"], Fallback::Empty);
}

mod document {
    use super::*;

    pub const TITLE: FieldRule = FieldRule::with_aliases("title", &["name"], Fallback::Empty);
    pub const DOC_TYPE: FieldRule = FieldRule::with_aliases("docType", &["type"], Fallback::Empty);
    pub const EXPIRATION_DATE: FieldRule =
        FieldRule::with_aliases("expirationDate", &["expiryDate"], Fallback::Empty);
    pub const NUMBER: FieldRule =
        FieldRule::with_aliases("number", &["documentNumber"], Fallback::Empty);
    pub const NOTES: FieldRule = FieldRule::new("notes", Fallback::Empty);
}

mod policy {
    use super::*;

    pub const NAME: FieldRule =
        FieldRule::with_aliases("policyName", &["name", "title"], Fallback::Empty);
    pub const PROVIDER: FieldRule =
        FieldRule::with_aliases("provider", &["company", "insurer"], Fallback::Empty);
    pub const POLICY_TYPE: FieldRule =
        FieldRule::with_aliases("policyType", &["type"], Fallback::Empty);
    pub const POLICY_NUMBER: FieldRule =
        FieldRule::with_aliases("policyNumber", &["number"], Fallback::Empty);
    pub const PREMIUM_AMOUNT: FieldRule = FieldRule::new("premiumAmount", Fallback::Zero);
    pub const CURRENCY: FieldRule = FieldRule::new("currency", Fallback::Text("USD"));
    pub const FREQUENCY: FieldRule =
        FieldRule::with_aliases("paymentFrequency", &["frequency"], Fallback::Text("Monthly"));
    pub const START_DATE: FieldRule = FieldRule::new("startDate", Fallback::Empty);
    pub const END_DATE: FieldRule = FieldRule::new("endDate", Fallback::Empty);
    pub const NEXT_PAYMENT_DATE: FieldRule = FieldRule::with_aliases(
        "nextPaymentDate",
        &["paymentDueDate", "dueDate"],
        Fallback::Empty,
    );
    pub const NOTES: FieldRule = FieldRule::with_aliases("notes", &["coverage"], Fallback::Empty);
}

/// Flatten a model reply into a list of raw candidates: an array as is, an
/// object holding an array under `wrapper`, or anything else as one item.
pub fn as_list<'a>(value: &'a Value, wrapper: &str) -> Vec<&'a Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get(wrapper) {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        other => vec![other],
    }
}

fn build_transaction(
    raw: &Value,
    description: &FieldRule,
    source: Source,
    today: NaiveDate,
) -> NewTransaction {
    use transaction::*;

    let amount = AMOUNT.number(raw);
    NewTransaction {
        date: DATE.text(raw, today),
        amount: if amount.is_finite() { amount } else { 0.0 },
        currency: CURRENCY.text(raw, today),
        category: CATEGORY.text(raw, today),
        payment_method: PAYMENT_METHOD.text(raw, today),
        description: description.text(raw, today),
        source: source.as_str().to_string(),
    }
}

fn is_usable(tx: &NewTransaction) -> bool {
    tx.amount > 0.0 && (!tx.description.is_empty() || !tx.category.is_empty())
}

/// Transactions read from a receipt or screenshot
pub fn transactions(parsed: &Value, today: NaiveDate) -> Vec<NewTransaction> {
    as_list(parsed, "transactions")
        .into_iter()
        .map(|raw| build_transaction(raw, &transaction::DESCRIPTION, Source::ImageAi, today))
        .filter(is_usable)
        .collect()
}

/// The single transaction described by a free-text note
pub fn transaction_from_note(parsed: &Value, today: NaiveDate) -> NewTransaction {
    build_transaction(parsed, &transaction::NOTE_DESCRIPTION, Source::TextAi, today)
}

/// Documents read from a photo or screenshot
pub fn documents(parsed: &Value, today: NaiveDate) -> Vec<NewDocument> {
    use document::*;

    as_list(parsed, "documents")
        .into_iter()
        .map(|raw| NewDocument {
            title: TITLE.text(raw, today),
            doc_type: DOC_TYPE.text(raw, today),
            expiration_date: EXPIRATION_DATE.text(raw, today),
            number: NUMBER.text(raw, today),
            notes: NOTES.text(raw, today),
            source: Source::ImageAi.as_str().to_string(),
            email: String::new(),
        })
        .filter(|doc| {
            !doc.title.is_empty() || !doc.expiration_date.is_empty() || !doc.doc_type.is_empty()
        })
        .collect()
}

/// Policies read from a photo, screenshot or PDF
pub fn policies(parsed: &Value, today: NaiveDate) -> Vec<NewPolicy> {
    use policy::*;

    as_list(parsed, "policies")
        .into_iter()
        .map(|raw| {
            let premium = PREMIUM_AMOUNT.number(raw);
            NewPolicy {
                policy_name: NAME.text(raw, today),
                provider: PROVIDER.text(raw, today),
                policy_type: POLICY_TYPE.text(raw, today),
                policy_number: POLICY_NUMBER.text(raw, today),
                premium_amount: if premium.is_finite() { premium } else { 0.0 },
                currency: CURRENCY.text(raw, today),
                payment_frequency: PaymentFrequency::sanitize(
                    FREQUENCY.raw_text(raw).ok().as_deref(),
                ),
                start_date: START_DATE.text(raw, today),
                end_date: END_DATE.text(raw, today),
                next_payment_date: NEXT_PAYMENT_DATE.text(raw, today),
                notes: NOTES.text(raw, today),
                source: Source::PolicyAi.as_str().to_string(),
            }
        })
        .filter(|p| {
            !p.policy_name.is_empty() || !p.provider.is_empty() || !p.next_payment_date.is_empty()
        })
        .collect()
}

/// Pick the receipt's payable total: the largest amount, with later
/// candidates winning ties (totals are printed at the bottom).
pub fn select_receipt_total(candidates: Vec<NewTransaction>) -> Option<NewTransaction> {
    candidates.into_iter().max_by(|a, b| {
        a.amount
            .partial_cmp(&b.amount)
            .unwrap_or(Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_as_list_shapes() {
        let array = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(as_list(&array, "transactions").len(), 2);

        let wrapped = json!({"transactions": [{"a": 1}]});
        assert_eq!(as_list(&wrapped, "transactions"), vec![&json!({"a": 1})]);

        let bare = json!({"a": 1});
        assert_eq!(as_list(&bare, "transactions"), vec![&bare]);

        let wrong_wrapper = json!({"documents": [{"a": 1}]});
        assert_eq!(as_list(&wrong_wrapper, "transactions").len(), 1);
    }

    #[test]
    fn test_transactions_defaults_and_filter() {
        let parsed = json!([
            {"amount": "12.40", "description": "Cafe"},
            {"amount": 0, "description": "Balance"},
            {"amount": -5, "description": "Refund"},
            {"amount": "n/a", "description": "Garbage"},
            {"amount": 3, "category": "Food", "date": "2024-05-01", "currency": "EUR"}
        ]);
        let txs = transactions(&parsed, today());
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].amount, 12.4);
        assert_eq!(txs[0].date, "2024-05-10");
        assert_eq!(txs[0].currency, "USD");
        assert_eq!(txs[0].category, "Other");
        assert_eq!(txs[0].payment_method, "Other");
        assert_eq!(txs[0].source, "Image AI");
        assert_eq!(txs[1].currency, "EUR");
        assert_eq!(txs[1].date, "2024-05-01");
    }

    #[test]
    fn test_empty_object_yields_nothing() {
        assert!(transactions(&json!({}), today()).is_empty());
        assert!(documents(&json!({}), today()).is_empty());
        assert!(policies(&json!({}), today()).is_empty());
    }

    #[test]
    fn test_note_uses_merchant_alias() {
        let tx = transaction_from_note(&json!({"amount": 12, "merchant": "Lunch"}), today());
        assert_eq!(tx.description, "Lunch");
        assert_eq!(tx.source, "Text AI");
        assert_eq!(tx.amount, 12.0);

        let tx = transaction_from_note(&json!({"description": "Taxi", "merchant": "Uber"}), today());
        assert_eq!(tx.description, "Taxi");
    }

    #[test]
    fn test_document_aliases() {
        let docs = documents(
            &json!({"documents": [
                {"name": "Jane Passport", "type": "passport", "expiryDate": "2030-01-01", "documentNumber": "X1"},
                {"notes": "unreadable"}
            ]}),
            today(),
        );
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Jane Passport");
        assert_eq!(docs[0].doc_type, "passport");
        assert_eq!(docs[0].expiration_date, "2030-01-01");
        assert_eq!(docs[0].number, "X1");
        assert_eq!(docs[0].source, "Image AI");
    }

    #[test]
    fn test_policy_aliases() {
        let found = policies(
            &json!([{
                "title": "Auto Plus",
                "insurer": "Acme",
                "type": "auto",
                "number": "P-9",
                "premiumAmount": "120.5",
                "frequency": "quarterly",
                "dueDate": "2024-06-01",
                "coverage": "Collision"
            }]),
            today(),
        );
        let p = &found[0];
        assert_eq!(p.policy_name, "Auto Plus");
        assert_eq!(p.provider, "Acme");
        assert_eq!(p.policy_type, "auto");
        assert_eq!(p.policy_number, "P-9");
        assert_eq!(p.premium_amount, 120.5);
        assert_eq!(p.currency, "USD");
        assert_eq!(p.payment_frequency, PaymentFrequency::Quarterly);
        assert_eq!(p.next_payment_date, "2024-06-01");
        assert_eq!(p.notes, "Collision");
        assert_eq!(p.source, "Policy AI");
    }

    #[test]
    fn test_select_receipt_total() {
        let make = |amount: f64, description: &str| NewTransaction {
            date: "2024-05-10".into(),
            amount,
            currency: "USD".into(),
            category: "Food".into(),
            payment_method: "Cash".into(),
            description: description.into(),
            source: "Image AI".into(),
        };
        let best = select_receipt_total(vec![
            make(4.5, "Coffee"),
            make(12.0, "Subtotal"),
            make(12.0, "Total"),
            make(3.0, "Tax"),
        ])
        .unwrap();
        assert_eq!(best.description, "Total");
        assert!(select_receipt_total(vec![]).is_none());

        let best = select_receipt_total(vec![make(10.0, "a"), make(25.0, "b"), make(25.0, "c")])
            .unwrap();
        assert_eq!(best.description, "c");
    }

    #[test]
    fn test_chatty_fenced_reply_to_transactions() {
        let reply = "Sure! ```json\n[{\"amount\": 12.5, \"category\": \"Food\"}]\n```";
        let txs = transactions(&crate::ai::parsing::extract_json(reply), today());
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 12.5);
        assert_eq!(txs[0].category, "Food");
    }
}
