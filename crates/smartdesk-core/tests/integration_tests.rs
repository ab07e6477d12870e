//! Integration tests for smartdesk-core
//!
//! These tests exercise the payload → validation → store → aggregation
//! workflow against the in-memory store and the mock model backend.

use chrono::NaiveDate;
use serde_json::json;

use smartdesk_core::{
    ai::{AIClient, MockBackend, Upload},
    datastore::{Datastore, Store},
    digest,
    filters::{ExpiryWindow, TransactionFilter},
    insights::{budget_statuses, compute_insights, policy_insights},
    mailer::{Mailer, MemoryMailer},
    validation::{validate_budget, validate_document, validate_policy, validate_transaction},
    PaymentFrequency,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

// =============================================================================
// Transactions and budgets
// =============================================================================

#[tokio::test]
async fn test_transactions_flow_into_budgets_and_insights() {
    let store = Store::memory();

    for payload in [
        json!({"date": "2024-05-01", "amount": 40, "currency": "USD", "category": "Food"}),
        json!({"date": "2024-05-03", "amount": "60", "currency": "USD", "category": "Food", "paymentMethod": "UPI"}),
        json!({"date": "2024-05-03", "amount": 900, "currency": "USD", "category": "Rent"}),
        json!({"date": "2024-04-28", "amount": 25, "currency": "USD", "category": "Food"}),
    ] {
        let tx = validate_transaction(&payload, today()).unwrap();
        store.create_transaction(&tx).await.unwrap();
    }

    store
        .upsert_budget(&validate_budget(&json!({"category": "Food", "monthlyLimit": 80})).unwrap())
        .await
        .unwrap();

    let transactions = store.list_transactions().await.unwrap();
    assert_eq!(transactions[0].date, "2024-05-03");

    let budgets = store.list_budgets().await.unwrap();
    let statuses = budget_statuses(&budgets, &transactions, today());
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].spent, 100.0);
    assert_eq!(statuses[0].remaining, 0.0);
    assert_eq!(statuses[0].percent_used, 100.0);

    let filter = TransactionFilter::from_query(Some("2024-05-01"), None, None).unwrap();
    let summary = compute_insights(&filter.apply(transactions));
    assert_eq!(summary.count, 3);
    assert_eq!(summary.total_spent, 1000.0);
    assert_eq!(summary.top_category.category, "Rent");
    assert_eq!(summary.trend.len(), 2);
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_store() {
    let store = Store::memory();
    let err = validate_transaction(&json!({"amount": -5, "currency": "USD"}), today()).unwrap_err();
    assert_eq!(err.to_string(), "amount must be greater than 0");
    assert!(store.list_transactions().await.unwrap().is_empty());
}

// =============================================================================
// Documents and policies
// =============================================================================

#[tokio::test]
async fn test_extracted_documents_are_saved_and_filtered() {
    let store = Store::memory();
    let ai = AIClient::mock();
    let photo = Upload::new(vec![1, 2, 3]).with_mime_type("image/png");

    for doc in ai.extract_documents_from_image(&photo, today()).await.unwrap() {
        store.create_document(&doc).await.unwrap();
    }
    store
        .create_document(
            &validate_document(
                &json!({"title": "Driving licence", "expirationDate": "2024-07-01"}),
                today(),
            )
            .unwrap(),
        )
        .await
        .unwrap();

    let all = store.list_documents().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Driving licence");

    let window = ExpiryWindow::from_query(Some("3"), None).unwrap();
    let soon = window.filter_documents(all, 8, today());
    assert_eq!(soon.len(), 1);
    assert_eq!(soon[0].title, "Driving licence");
}

#[tokio::test]
async fn test_policies_from_pdf_feed_insights() {
    let store = Store::memory();
    let ai = AIClient::Mock(MockBackend::new().with_pdf(true));
    let pdf = Upload::new(b"%PDF-1.7".to_vec()).with_filename("policy.pdf");

    for policy in ai.extract_policies_from_file(&pdf, today()).await.unwrap() {
        assert_eq!(policy.payment_frequency, PaymentFrequency::Monthly);
        store.create_policy(&policy).await.unwrap();
    }
    let manual = validate_policy(
        &json!({
            "policyName": "Home",
            "provider": "Hearth Mutual",
            "premiumAmount": 300,
            "paymentFrequency": "Yearly",
            "nextPaymentDate": "2024-12-01"
        }),
        today(),
    )
    .unwrap();
    store.create_policy(&manual).await.unwrap();

    let insights = policy_insights(&store.list_policies().await.unwrap(), today());
    assert_eq!(insights.total, 2);
    assert_eq!(insights.due_soon_count, 1);
    let next = insights.next_payment.unwrap();
    assert_eq!(next.policy_name, "Auto Shield");
    assert_eq!(next.date, "2024-06-01");
}

// =============================================================================
// Digests
// =============================================================================

#[tokio::test]
async fn test_digests_render_from_store() {
    let store = Store::memory();
    store
        .create_document(
            &validate_document(
                &json!({"title": "Visa <work>", "docType": "visa", "expirationDate": "2024-06-15"}),
                today(),
            )
            .unwrap(),
        )
        .await
        .unwrap();

    let memory = MemoryMailer::new();
    let mailer = Mailer::Memory(memory.clone());

    digest::send_document_reminder(&store, &mailer, 8, today()).await.unwrap();
    digest::send_spending_summary(&store, &mailer, today()).await.unwrap();

    let sent = memory.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].html.contains("Visa &lt;work&gt;"));
    assert_eq!(sent[1].html, "<p>No expenses recorded yet this month.</p>");
}
