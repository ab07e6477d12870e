//! Error types for Smart Desk

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// One or more payload rules were violated. Every violation is kept.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    /// The model answered but nothing usable survived normalization
    #[error("{0}")]
    ExtractionEmpty(String),

    /// The model call itself failed or returned garbage
    #[error("{0}")]
    Extraction(String),

    #[error("Datastore error ({status}): {message}")]
    Datastore { status: u16, message: String },

    /// A required external dependency is absent from configuration
    #[error("{0}")]
    NotConfigured(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mail error: {0}")]
    Mail(String),
}

impl Error {
    /// HTTP status code this error surfaces as
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => 400,
            Self::Auth(_) => 401,
            Self::NotFound(_) => 404,
            Self::ExtractionEmpty(_) => 422,
            Self::Extraction(_) | Self::Datastore { .. } => 502,
            Self::Unavailable(_) => 503,
            Self::NotConfigured(_) | Self::Http(_) | Self::Json(_) | Self::Mail(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_rules() {
        let err = Error::Validation(vec![
            "amount is required".to_string(),
            "currency is required".to_string(),
        ]);
        assert_eq!(err.to_string(), "amount is required, currency is required");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Auth("Invalid auth token".into()).status_code(), 401);
        assert_eq!(Error::ExtractionEmpty("nothing".into()).status_code(), 422);
        assert_eq!(Error::NotConfigured("no key".into()).status_code(), 500);
        assert_eq!(Error::Unavailable("pdf off".into()).status_code(), 503);
    }
}
