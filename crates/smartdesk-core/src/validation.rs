//! Payload validation for manual entry
//!
//! Each validator takes the raw request body and either returns the
//! canonical record or an [`Error::Validation`] listing every rule that
//! failed. Optional fields never fail; they fall back through the rule
//! tables below.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::fields::{match_allowed, Fallback, FieldError, FieldRule};
use crate::models::{
    NewBudget, NewDocument, NewPolicy, NewTransaction, PaymentFrequency, CATEGORIES,
    PAYMENT_METHODS,
};

const MANUAL: Fallback = Fallback::Text("Manual");

mod transaction {
    use super::*;

    pub const DATE: FieldRule = FieldRule::new("date", Fallback::Today);
    pub const AMOUNT: FieldRule = FieldRule::new("amount", Fallback::Zero);
    pub const CURRENCY: FieldRule = FieldRule::new("currency", Fallback::Empty);
    pub const CATEGORY: FieldRule = FieldRule::new("category", Fallback::Text("Other"));
    pub const PAYMENT_METHOD: FieldRule =
        FieldRule::new("paymentMethod", Fallback::Text("Other"));
    pub const DESCRIPTION: FieldRule = FieldRule::new("description", Fallback::Empty);
    pub const SOURCE: FieldRule = FieldRule::new("source", MANUAL);
}

mod budget {
    use super::*;

    pub const CATEGORY: FieldRule = FieldRule::new("category", Fallback::Empty);
    pub const MONTHLY_LIMIT: FieldRule = FieldRule::new("monthlyLimit", Fallback::Zero);
}

mod document {
    use super::*;

    pub const TITLE: FieldRule = FieldRule::new("title", Fallback::Empty);
    pub const DOC_TYPE: FieldRule = FieldRule::new("docType", Fallback::Empty);
    pub const EXPIRATION_DATE: FieldRule = FieldRule::new("expirationDate", Fallback::Empty);
    pub const NUMBER: FieldRule = FieldRule::new("number", Fallback::Empty);
    pub const NOTES: FieldRule = FieldRule::new("notes", Fallback::Empty);
    pub const SOURCE: FieldRule = FieldRule::new("source", MANUAL);
    pub const EMAIL: FieldRule = FieldRule::new("email", Fallback::Empty);
}

mod policy {
    use super::*;

    pub const NAME: FieldRule = FieldRule::with_aliases("policyName", &["name"], Fallback::Empty);
    pub const PROVIDER: FieldRule = FieldRule::new("provider", Fallback::Empty);
    pub const POLICY_TYPE: FieldRule = FieldRule::new("policyType", Fallback::Empty);
    pub const POLICY_NUMBER: FieldRule = FieldRule::new("policyNumber", Fallback::Empty);
    pub const PREMIUM_AMOUNT: FieldRule = FieldRule::new("premiumAmount", Fallback::Zero);
    pub const CURRENCY: FieldRule = FieldRule::new("currency", Fallback::Text("USD"));
    pub const FREQUENCY: FieldRule =
        FieldRule::with_aliases("paymentFrequency", &["frequency"], Fallback::Text("Monthly"));
    pub const START_DATE: FieldRule = FieldRule::new("startDate", Fallback::Empty);
    pub const END_DATE: FieldRule = FieldRule::new("endDate", Fallback::Empty);
    pub const NEXT_PAYMENT_DATE: FieldRule = FieldRule::new("nextPaymentDate", Fallback::Empty);
    pub const NOTES: FieldRule = FieldRule::new("notes", Fallback::Empty);
    pub const SOURCE: FieldRule = FieldRule::new("source", MANUAL);
}

fn finish<T>(errors: Vec<String>, record: impl FnOnce() -> T) -> Result<T> {
    if errors.is_empty() {
        Ok(record())
    } else {
        Err(Error::Validation(errors))
    }
}

fn require_text(rule: &FieldRule, payload: &Value, errors: &mut Vec<String>) -> String {
    match rule.raw_text(payload) {
        Ok(value) => value,
        Err(_) => {
            errors.push(format!("{} is required", rule.key));
            String::new()
        }
    }
}

/// Validate a manual expense entry
pub fn validate_transaction(payload: &Value, today: NaiveDate) -> Result<NewTransaction> {
    use transaction::*;

    let mut errors = Vec::new();

    let amount = AMOUNT.raw_number(payload);
    if amount == Err(FieldError::Missing) {
        errors.push("amount is required".to_string());
    }
    let currency = require_text(&CURRENCY, payload, &mut errors);
    match amount {
        Ok(n) if n <= 0.0 => errors.push("amount must be greater than 0".to_string()),
        Err(FieldError::NotANumber) => errors.push("amount must be a number".to_string()),
        _ => {}
    }

    finish(errors, || NewTransaction {
        date: DATE.text(payload, today),
        amount: amount.unwrap_or(0.0),
        currency,
        category: match_allowed(CATEGORY.raw_text(payload).ok().as_deref(), CATEGORIES, "Other")
            .to_string(),
        payment_method: match_allowed(
            PAYMENT_METHOD.raw_text(payload).ok().as_deref(),
            PAYMENT_METHODS,
            "Other",
        )
        .to_string(),
        description: DESCRIPTION.text(payload, today),
        source: SOURCE.text(payload, today),
    })
}

/// Validate a budget upsert. The category is kept as typed.
pub fn validate_budget(payload: &Value) -> Result<NewBudget> {
    use budget::*;

    let mut errors = Vec::new();
    let category = require_text(&CATEGORY, payload, &mut errors);
    let limit = MONTHLY_LIMIT.raw_number(payload);
    if !matches!(limit, Ok(n) if n > 0.0) {
        errors.push("monthly limit must be greater than 0".to_string());
    }

    finish(errors, || NewBudget {
        category,
        monthly_limit: limit.unwrap_or(0.0),
    })
}

/// Validate a document entry
pub fn validate_document(payload: &Value, today: NaiveDate) -> Result<NewDocument> {
    use document::*;

    let mut errors = Vec::new();
    let title = require_text(&TITLE, payload, &mut errors);
    let expiration_date = require_text(&EXPIRATION_DATE, payload, &mut errors);

    finish(errors, || NewDocument {
        title,
        doc_type: DOC_TYPE.text(payload, today),
        expiration_date,
        number: NUMBER.text(payload, today),
        notes: NOTES.text(payload, today),
        source: SOURCE.text(payload, today),
        email: EMAIL.text(payload, today),
    })
}

/// Validate a policy entry
pub fn validate_policy(payload: &Value, today: NaiveDate) -> Result<NewPolicy> {
    use policy::*;

    let mut errors = Vec::new();
    let policy_name = require_text(&NAME, payload, &mut errors);
    let provider = require_text(&PROVIDER, payload, &mut errors);
    let next_payment_date = require_text(&NEXT_PAYMENT_DATE, payload, &mut errors);

    let premium_amount = match PREMIUM_AMOUNT.raw_number(payload) {
        Ok(n) if n >= 0.0 => n,
        Err(FieldError::Missing) => 0.0,
        _ => {
            errors.push("premiumAmount must be a positive number".to_string());
            0.0
        }
    };

    finish(errors, || NewPolicy {
        policy_name,
        provider,
        policy_type: POLICY_TYPE.text(payload, today),
        policy_number: POLICY_NUMBER.text(payload, today),
        premium_amount,
        currency: CURRENCY.text(payload, today),
        payment_frequency: PaymentFrequency::sanitize(FREQUENCY.raw_text(payload).ok().as_deref()),
        start_date: START_DATE.text(payload, today),
        end_date: END_DATE.text(payload, today),
        next_payment_date,
        notes: NOTES.text(payload, today),
        source: SOURCE.text(payload, today),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn messages(err: Error) -> Vec<String> {
        match err {
            Error::Validation(rules) => rules,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_transaction_defaults() {
        let tx = validate_transaction(
            &json!({"amount": "12.50", "currency": "USD", "category": "food"}),
            today(),
        )
        .unwrap();
        assert_eq!(tx.amount, 12.5);
        assert_eq!(tx.date, "2024-05-10");
        assert_eq!(tx.category, "Food");
        assert_eq!(tx.payment_method, "Other");
        assert_eq!(tx.description, "");
        assert_eq!(tx.source, "Manual");
    }

    #[test]
    fn test_transaction_unknown_category_becomes_other() {
        let tx = validate_transaction(
            &json!({"amount": 3, "currency": "INR", "category": "Crypto", "paymentMethod": "upi"}),
            today(),
        )
        .unwrap();
        assert_eq!(tx.category, "Other");
        assert_eq!(tx.payment_method, "UPI");

        let tx = validate_transaction(
            &json!({"amount": 3, "currency": "USD", "category": "Entertainment"}),
            today(),
        )
        .unwrap();
        assert_eq!(tx.category, "Other");
    }

    #[test]
    fn test_transaction_collects_all_errors() {
        let err = validate_transaction(&json!({}), today()).unwrap_err();
        assert_eq!(
            messages(err),
            vec!["amount is required", "currency is required"]
        );

        let err = validate_transaction(&json!({"amount": "abc"}), today()).unwrap_err();
        assert_eq!(
            messages(err),
            vec!["currency is required", "amount must be a number"]
        );
    }

    #[test]
    fn test_transaction_rejects_non_positive() {
        let err = validate_transaction(&json!({"amount": 0, "currency": "USD"}), today())
            .unwrap_err();
        assert_eq!(err.to_string(), "amount must be greater than 0");
        assert!(validate_transaction(&json!({"amount": -4, "currency": "USD"}), today()).is_err());
    }

    #[test]
    fn test_budget_rules() {
        let budget = validate_budget(&json!({"category": "food", "monthlyLimit": "250"})).unwrap();
        assert_eq!(budget.category, "food");
        assert_eq!(budget.monthly_limit, 250.0);

        let err = validate_budget(&json!({"monthlyLimit": 0})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "category is required, monthly limit must be greater than 0"
        );
        assert!(validate_budget(&json!({"category": "Food", "monthlyLimit": "x"})).is_err());
    }

    #[test]
    fn test_document_rules() {
        let doc = validate_document(
            &json!({"title": "Passport", "expirationDate": "2030-01-01"}),
            today(),
        )
        .unwrap();
        assert_eq!(doc.doc_type, "");
        assert_eq!(doc.source, "Manual");

        let err = validate_document(&json!({"docType": "ID"}), today()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "title is required, expirationDate is required"
        );
    }

    #[test]
    fn test_policy_legacy_keys_and_defaults() {
        let policy = validate_policy(
            &json!({
                "name": "Home cover",
                "provider": "Acme",
                "nextPaymentDate": "2024-06-01",
                "frequency": "yearly"
            }),
            today(),
        )
        .unwrap();
        assert_eq!(policy.policy_name, "Home cover");
        assert_eq!(policy.payment_frequency, PaymentFrequency::Yearly);
        assert_eq!(policy.currency, "USD");
        assert_eq!(policy.premium_amount, 0.0);
    }

    #[test]
    fn test_policy_premium_rules() {
        let base = json!({"policyName": "Car", "provider": "Acme", "nextPaymentDate": "2024-06-01"});

        let mut zero = base.clone();
        zero["premiumAmount"] = json!(0);
        assert_eq!(validate_policy(&zero, today()).unwrap().premium_amount, 0.0);

        let mut negative = base.clone();
        negative["premiumAmount"] = json!(-1);
        assert_eq!(
            validate_policy(&negative, today()).unwrap_err().to_string(),
            "premiumAmount must be a positive number"
        );

        let mut junk = base;
        junk["premiumAmount"] = json!("lots");
        assert!(validate_policy(&junk, today()).is_err());
    }

    #[test]
    fn test_policy_missing_fields() {
        let err = validate_policy(&json!({}), today()).unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "policyName is required",
                "provider is required",
                "nextPaymentDate is required"
            ]
        );
    }
}
