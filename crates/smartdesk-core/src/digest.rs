//! Email digests
//!
//! Two jobs: a weekly reminder of documents about to expire and a daily
//! month-to-date spending summary. Rendering is pure; the `send_*`
//! functions fetch from the store, render and hand off to the mailer.

use chrono::NaiveDate;
use tracing::info;

use crate::datastore::Datastore;
use crate::dates::month_bounds;
use crate::error::Result;
use crate::filters::{ExpiryWindow, TransactionFilter};
use crate::insights::compute_insights;
use crate::mailer::{Mailer, SentMail};
use crate::models::{Document, InsightSummary};

pub const DOCUMENT_REMINDER_SUBJECT: &str = "Expiring documents reminder";
pub const SPENDING_SUMMARY_SUBJECT: &str = "Daily spending summary";

/// Categories listed in the spending summary table
const TOP_CATEGORIES: usize = 5;

/// Escape text for interpolation into HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

pub fn render_document_reminder(documents: &[Document], months: u32) -> String {
    if documents.is_empty() {
        return "<p>No documents expiring in the configured window.</p>".to_string();
    }

    let mut html = format!("<p>Documents expiring within {} months:</p><ul>", months);
    for doc in documents {
        html.push_str(&format!(
            "<li><strong>{}</strong> ({}) &mdash; expires {}",
            escape_html(or_placeholder(&doc.title, "Document")),
            escape_html(or_placeholder(&doc.doc_type, "Type?")),
            escape_html(or_placeholder(&doc.expiration_date, "unknown")),
        ));
        if !doc.number.trim().is_empty() {
            html.push_str(&format!(" &mdash; #{}", escape_html(&doc.number)));
        }
        html.push_str("</li>");
    }
    html.push_str("</ul>");
    html
}

pub fn render_spending_summary(
    summary: &InsightSummary,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    if summary.count == 0 {
        return "<p>No expenses recorded yet this month.</p>".to_string();
    }

    let mut html = format!(
        "<p>Spending from {} to {}:</p><ul>\
         <li><strong>Total:</strong> {:.2} across {} transactions</li>\
         <li><strong>Average per day:</strong> {:.2}</li>\
         <li><strong>Top category:</strong> {} ({:.2})</li></ul>",
        start,
        end,
        summary.total_spent,
        summary.count,
        summary.average_daily,
        escape_html(&summary.top_category.category),
        summary.top_category.amount,
    );

    html.push_str("<table><thead><tr><th>Category</th><th>Amount</th></tr></thead><tbody>");
    for row in summary.category_breakdown.iter().take(TOP_CATEGORIES) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td></tr>",
            escape_html(&row.category),
            row.amount
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Email the documents expiring within `months` of `today`
pub async fn send_document_reminder<S: Datastore + ?Sized>(
    store: &S,
    mailer: &Mailer,
    months: u32,
    today: NaiveDate,
) -> Result<SentMail> {
    let window = ExpiryWindow {
        months: Some(months),
        upcoming_only: true,
    };
    let documents = window.filter_documents(store.list_documents().await?, months, today);
    let html = render_document_reminder(&documents, months);
    let sent = mailer.send(DOCUMENT_REMINDER_SUBJECT, &html).await?;
    info!(items = documents.len(), "Document reminder sent");
    Ok(sent)
}

/// Email the month-to-date spending summary
pub async fn send_spending_summary<S: Datastore + ?Sized>(
    store: &S,
    mailer: &Mailer,
    today: NaiveDate,
) -> Result<SentMail> {
    let (start, _) = month_bounds(today);
    let filter = TransactionFilter {
        from: Some(start),
        to: Some(today),
        category: None,
    };
    let transactions = filter.apply(store.list_transactions().await?);
    let summary = compute_insights(&transactions);
    let html = render_spending_summary(&summary, start, today);
    let sent = mailer.send(SPENDING_SUMMARY_SUBJECT, &html).await?;
    info!(count = summary.count, total = summary.total_spent, "Spending summary sent");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::MemoryStore;
    use crate::mailer::MemoryMailer;
    use crate::models::{NewDocument, NewTransaction};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn doc(title: &str, exp: &str, number: &str) -> NewDocument {
        NewDocument {
            title: title.into(),
            doc_type: "passport".into(),
            expiration_date: exp.into(),
            number: number.into(),
            notes: String::new(),
            source: "Manual".into(),
            email: String::new(),
        }
    }

    fn tx(date: &str, amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            date: date.into(),
            amount,
            currency: "USD".into(),
            category: category.into(),
            payment_method: "Cash".into(),
            description: String::new(),
            source: "Manual".into(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_document_reminder() {
        assert_eq!(
            render_document_reminder(&[], 8),
            "<p>No documents expiring in the configured window.</p>"
        );

        let docs = vec![
            doc("Passport <US>", "2024-06-01", "X1").into_record("1".into(), None),
            doc("", "", "").into_record("2".into(), None),
        ];
        let html = render_document_reminder(&docs, 3);
        assert!(html.starts_with("<p>Documents expiring within 3 months:</p><ul>"));
        assert!(html.contains("<strong>Passport &lt;US&gt;</strong> (passport) &mdash; expires 2024-06-01 &mdash; #X1</li>"));
        assert!(html.contains("<strong>Document</strong> (passport) &mdash; expires unknown</li>"));
    }

    #[test]
    fn test_render_empty_spending_summary() {
        let summary = compute_insights(&[]);
        assert_eq!(
            render_spending_summary(&summary, d("2024-05-01"), d("2024-05-10")),
            "<p>No expenses recorded yet this month.</p>"
        );
    }

    #[tokio::test]
    async fn test_send_document_reminder() {
        let store = MemoryStore::new();
        store.create_document(&doc("Passport", "2024-06-01", "")).await.unwrap();
        store.create_document(&doc("Old visa", "2024-01-01", "")).await.unwrap();
        store.create_document(&doc("Far licence", "2030-01-01", "")).await.unwrap();

        let memory = MemoryMailer::new();
        let mailer = Mailer::Memory(memory.clone());
        send_document_reminder(&store, &mailer, 8, d("2024-05-10")).await.unwrap();

        let sent = memory.sent();
        assert_eq!(sent[0].subject, "Expiring documents reminder");
        assert!(sent[0].html.contains("Passport"));
        assert!(!sent[0].html.contains("Old visa"));
        assert!(!sent[0].html.contains("Far licence"));
    }

    #[tokio::test]
    async fn test_send_spending_summary_month_to_date() {
        let store = MemoryStore::new();
        store.create_transaction(&tx("2024-05-02", 40.0, "Food")).await.unwrap();
        store.create_transaction(&tx("2024-05-03", 60.0, "Rent")).await.unwrap();
        store.create_transaction(&tx("2024-04-30", 500.0, "Travel")).await.unwrap();

        let memory = MemoryMailer::new();
        let mailer = Mailer::Memory(memory.clone());
        send_spending_summary(&store, &mailer, d("2024-05-10")).await.unwrap();

        let sent = memory.sent();
        assert_eq!(sent[0].subject, "Daily spending summary");
        let html = &sent[0].html;
        assert!(html.contains("Spending from 2024-05-01 to 2024-05-10"));
        assert!(html.contains("100.00 across 2 transactions"));
        assert!(html.contains("<strong>Top category:</strong> Rent (60.00)"));
        assert!(html.contains("<tr><td>Rent</td><td>60.00</td></tr><tr><td>Food</td><td>40.00</td></tr>"));
        assert!(!html.contains("Travel"));
    }
}
