//! Types shared by AI backends

/// A single-turn chat request: one system prompt, one user message
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub parts: Vec<UserPart>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(system: &str, temperature: f32) -> Self {
        Self {
            system: system.to_string(),
            parts: Vec::new(),
            temperature,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(UserPart::Text(text.into()));
        self
    }

    pub fn attach(mut self, part: UserPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Whether the request carries an image or file
    pub fn has_attachment(&self) -> bool {
        self.parts.iter().any(|p| !matches!(p, UserPart::Text(_)))
    }
}

/// One piece of the user message
#[derive(Debug, Clone, PartialEq)]
pub enum UserPart {
    Text(String),
    Image {
        mime_type: String,
        data: Vec<u8>,
    },
    File {
        filename: String,
        mime_type: String,
        data: Vec<u8>,
    },
}

/// An uploaded file handed to an extraction task
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
}

impl Upload {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// PDF by content type, or by extension when the type is missing
    pub fn is_pdf(&self) -> bool {
        match &self.mime_type {
            Some(mime) if !mime.is_empty() => mime.to_ascii_lowercase().contains("pdf"),
            _ => self
                .filename
                .as_deref()
                .is_some_and(|f| f.to_ascii_lowercase().ends_with(".pdf")),
        }
    }

    /// Image part for a vision request. Non-image content types are sent
    /// as JPEG, which is what phone cameras and most screenshots produce.
    pub fn as_image(&self) -> UserPart {
        let mime_type = self
            .mime_type
            .as_deref()
            .filter(|m| m.starts_with("image/"))
            .unwrap_or("image/jpeg");
        UserPart::Image {
            mime_type: mime_type.to_string(),
            data: self.data.clone(),
        }
    }

    pub fn as_file(&self) -> UserPart {
        UserPart::File {
            filename: self
                .filename
                .clone()
                .unwrap_or_else(|| "policy.pdf".to_string()),
            mime_type: self
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/pdf".to_string()),
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_pdf_detection() {
        assert!(Upload::new(vec![]).with_mime_type("application/PDF").is_pdf());
        assert!(Upload::new(vec![]).with_filename("Policy.pdf").is_pdf());
        assert!(!Upload::new(vec![]).with_mime_type("image/png").with_filename("x.pdf").is_pdf());
        assert!(!Upload::new(vec![]).is_pdf());
    }

    #[test]
    fn test_upload_image_mime_fallback() {
        let part = Upload::new(vec![1]).with_mime_type("application/octet-stream").as_image();
        assert!(matches!(part, UserPart::Image { ref mime_type, .. } if mime_type == "image/jpeg"));
        let part = Upload::new(vec![1]).with_mime_type("image/png").as_image();
        assert!(matches!(part, UserPart::Image { ref mime_type, .. } if mime_type == "image/png"));
    }
}
