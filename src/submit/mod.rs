pub mod http;

pub use http::HttpTransport;

use std::collections::BTreeMap;

pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Every collected field, ready to be sent in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub fields: BTreeMap<String, String>,
}

impl SubmissionPayload {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// `application/x-www-form-urlencoded` body including the CSRF form field.
    pub fn form_encoded(&self, csrf_token: &str) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, _)| name.as_str() != CSRF_FORM_FIELD)
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect();
        if !csrf_token.is_empty() {
            parts.push(format!(
                "{CSRF_FORM_FIELD}={}",
                urlencoding::encode(csrf_token)
            ));
        }
        parts.join("&")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub redirect: Option<String>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP collaborator: one POST carrying the whole form.
pub trait SubmitTransport {
    fn post(&self, payload: &SubmissionPayload) -> Result<TransportResponse, TransportError>;
}
