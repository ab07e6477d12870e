//! Model-backed extraction
//!
//! This module turns uploads and notes into candidate records. The model only
//! proposes; nothing here persists anything.
//!
//! # Architecture
//!
//! - `AIBackend` trait: one chat call plus health/identity
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//! - `parsing`: JSON recovery from free-form replies
//! - `normalize`: alias/default tables and the receipt total selection
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_config(&config.openai);
//!
//! if let Some(ref client) = ai {
//!     let found = client.extract_documents_from_image(&upload, today).await?;
//!     println!("{} documents", found.len());
//! }
//! ```

mod mock;
pub mod normalize;
mod openai_compatible;
pub mod parsing;
pub mod prompts;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub(crate) use mock::canned_reply;
pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::OpenAIConfig;
use crate::error::{Error, Result};
use crate::models::{NewDocument, NewPolicy, NewTransaction};

use parsing::extract_json;

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send one chat request and return the reply text.
    ///
    /// Transport and API failures surface as [`Error::Extraction`]. An
    /// empty reply is not an error here.
    async fn chat(&self, request: &ChatRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Whether PDFs may be forwarded as file parts
    fn supports_pdf(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI or any server speaking its chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

/// Error for an extraction route hit without a model configured
pub fn not_configured(input: &str) -> Error {
    Error::NotConfigured(format!(
        "OpenAI is not configured. Unable to extract data from {}.",
        input
    ))
}

impl AIClient {
    /// Create an AI client from configuration
    ///
    /// Returns None when no API key is set.
    pub fn from_config(config: &OpenAIConfig) -> Option<Self> {
        OpenAICompatibleBackend::from_config(config).map(AIClient::OpenAICompatible)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    fn backend(&self) -> &dyn AIBackend {
        match self {
            AIClient::OpenAICompatible(b) => b,
            AIClient::Mock(b) => b,
        }
    }

    /// Read a receipt or payment screenshot and return its payable total
    /// as a one-element list.
    pub async fn extract_transactions_from_image(
        &self,
        upload: &Upload,
        today: NaiveDate,
    ) -> Result<Vec<NewTransaction>> {
        let request = ChatRequest::new(prompts::RECEIPT_SYSTEM, prompts::VISION_TEMPERATURE)
            .text(prompts::RECEIPT_USER)
            .attach(upload.as_image());

        let parsed = extract_json(&self.send(&request).await?);
        let candidates = normalize::transactions(&parsed, today);
        debug!(candidates = candidates.len(), "Receipt candidates");

        let total = normalize::select_receipt_total(candidates).ok_or_else(|| {
            Error::ExtractionEmpty("AI could not read any transactions from the image.".into())
        })?;
        Ok(vec![total])
    }

    /// Read one expense from a free-text note
    pub async fn extract_transaction_from_text(
        &self,
        note: &str,
        today: NaiveDate,
    ) -> Result<NewTransaction> {
        let request = ChatRequest::new(prompts::NOTE_SYSTEM, prompts::TEXT_TEMPERATURE)
            .text(prompts::NOTE_USER)
            .text(note);

        let parsed = extract_json(&self.send(&request).await?);
        let tx = normalize::transaction_from_note(&parsed, today);
        if tx.amount <= 0.0 {
            return Err(Error::ExtractionEmpty(
                "AI could not find an amount in the note.".into(),
            ));
        }
        Ok(tx)
    }

    /// Read identity/official documents from a photo
    pub async fn extract_documents_from_image(
        &self,
        upload: &Upload,
        today: NaiveDate,
    ) -> Result<Vec<NewDocument>> {
        let request = ChatRequest::new(prompts::DOCUMENT_SYSTEM, prompts::VISION_TEMPERATURE)
            .text(prompts::DOCUMENT_USER)
            .attach(upload.as_image());

        let parsed = extract_json(&self.send(&request).await?);
        let documents = normalize::documents(&parsed, today);
        if documents.is_empty() {
            return Err(Error::ExtractionEmpty(
                "AI could not read any documents from the image.".into(),
            ));
        }
        Ok(documents)
    }

    /// Read insurance policies from a photo, or from a PDF when the
    /// backend allows it.
    pub async fn extract_policies_from_file(
        &self,
        upload: &Upload,
        today: NaiveDate,
    ) -> Result<Vec<NewPolicy>> {
        let attachment = if upload.is_pdf() {
            if !self.backend().supports_pdf() {
                return Err(Error::Unavailable(
                    "PDF policy extraction is disabled on this deployment.".into(),
                ));
            }
            upload.as_file()
        } else {
            upload.as_image()
        };

        let request = ChatRequest::new(prompts::POLICY_SYSTEM, prompts::VISION_TEMPERATURE)
            .text(prompts::POLICY_USER)
            .attach(attachment);

        let parsed = extract_json(&self.send(&request).await?);
        let policies = normalize::policies(&parsed, today);
        if policies.is_empty() {
            let from = if upload.is_pdf() { "file" } else { "image" };
            return Err(Error::ExtractionEmpty(format!(
                "AI could not read any policies from the {}.",
                from
            )));
        }
        Ok(policies)
    }

    async fn send(&self, request: &ChatRequest) -> Result<String> {
        let backend = self.backend();
        info!(
            model = %backend.model(),
            attachment = request.has_attachment(),
            "Sending extraction request"
        );
        backend.chat(request).await
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.backend().chat(request).await
    }

    async fn health_check(&self) -> bool {
        self.backend().health_check().await
    }

    fn supports_pdf(&self) -> bool {
        self.backend().supports_pdf()
    }

    fn model(&self) -> &str {
        self.backend().model()
    }

    fn host(&self) -> &str {
        self.backend().host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn image() -> Upload {
        Upload::new(vec![0xff, 0xd8, 0xff]).with_mime_type("image/jpeg")
    }

    #[tokio::test]
    async fn test_receipt_returns_single_total() {
        let client = AIClient::mock();
        let found = client
            .extract_transactions_from_image(&image(), today())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount, 12.75);
        assert_eq!(found[0].source, "Image AI");
    }

    #[tokio::test]
    async fn test_receipt_with_nothing_readable() {
        let client = AIClient::Mock(MockBackend::new().with_reply("Sorry, I can't read that."));
        let err = client
            .extract_transactions_from_image(&image(), today())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), "AI could not read any transactions from the image.");
    }

    #[tokio::test]
    async fn test_note_extraction() {
        let mock = MockBackend::new();
        let client = AIClient::Mock(mock.clone());
        let tx = client
            .extract_transaction_from_text("taxi 18 dollars", today())
            .await
            .unwrap();
        assert_eq!(tx.description, "Taxi to airport");
        assert_eq!(tx.date, "2024-05-10");
        assert_eq!(tx.source, "Text AI");

        let requests = mock.requests();
        let sent = &requests[0];
        assert_eq!(sent.temperature, prompts::TEXT_TEMPERATURE);
        assert_eq!(sent.parts.last(), Some(&UserPart::Text("taxi 18 dollars".into())));
    }

    #[tokio::test]
    async fn test_note_without_amount() {
        let client = AIClient::Mock(MockBackend::new().with_reply(r#"{"description": "lunch"}"#));
        let err = client
            .extract_transaction_from_text("had lunch", today())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "AI could not find an amount in the note.");
    }

    #[tokio::test]
    async fn test_documents_extraction() {
        let docs = AIClient::mock()
            .extract_documents_from_image(&image(), today())
            .await
            .unwrap();
        assert_eq!(docs[0].doc_type, "passport");
        assert_eq!(docs[0].expiration_date, "2031-03-14");
    }

    #[tokio::test]
    async fn test_pdf_policy_disabled() {
        let pdf = Upload::new(b"%PDF-1.4".to_vec()).with_mime_type("application/pdf");
        let err = AIClient::mock()
            .extract_policies_from_file(&pdf, today())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(
            err.to_string(),
            "PDF policy extraction is disabled on this deployment."
        );
    }

    #[tokio::test]
    async fn test_pdf_policy_enabled_sends_file_part() {
        let mock = MockBackend::new().with_pdf(true);
        let client = AIClient::Mock(mock.clone());
        let pdf = Upload::new(b"%PDF-1.4".to_vec())
            .with_mime_type("application/pdf")
            .with_filename("auto.pdf");
        let policies = client.extract_policies_from_file(&pdf, today()).await.unwrap();
        assert_eq!(policies[0].policy_name, "Auto Shield");
        assert_eq!(policies[0].premium_amount, 89.9);

        let requests = mock.requests();
        let sent = &requests[0];
        assert!(matches!(
            sent.parts.last(),
            Some(UserPart::File { filename, .. }) if filename == "auto.pdf"
        ));
    }

    #[tokio::test]
    async fn test_model_failure_is_extraction_error() {
        let client = AIClient::Mock(MockBackend::new().failing("connection refused"));
        let err = client
            .extract_documents_from_image(&image(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_not_configured_message() {
        assert_eq!(
            not_configured("image").to_string(),
            "OpenAI is not configured. Unable to extract data from image."
        );
    }
}
