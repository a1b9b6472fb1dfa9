use super::{
    SubmissionPayload, SubmitTransport, TransportError, TransportResponse, CSRF_HEADER,
};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking form POST over `ureq`. Redirects are followed; the final URL is
/// reported back as the redirect location when it differs from the action.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    action_url: String,
    csrf_token: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(action_url: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            action_url: action_url.into(),
            csrf_token: csrf_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn action_url(&self) -> &str {
        &self.action_url
    }

    fn request_error(&self, message: String) -> TransportError {
        TransportError::Request {
            url: self.action_url.clone(),
            message,
        }
    }
}

impl SubmitTransport for HttpTransport {
    fn post(&self, payload: &SubmissionPayload) -> Result<TransportResponse, TransportError> {
        let body = payload.form_encoded(&self.csrf_token);
        let mut request = ureq::post(&self.action_url)
            .timeout(self.timeout)
            .set("Content-Type", "application/x-www-form-urlencoded");
        if !self.csrf_token.is_empty() {
            request = request
                .set(CSRF_HEADER, &self.csrf_token)
                .set("Cookie", &format!("csrftoken={}", self.csrf_token));
        }

        match request.send_string(&body) {
            Ok(response) => {
                let final_url = response.get_url().to_string();
                Ok(TransportResponse {
                    status: response.status(),
                    redirect: (final_url != self.action_url).then_some(final_url),
                })
            }
            Err(ureq::Error::Status(status, _)) => Ok(TransportResponse {
                status,
                redirect: None,
            }),
            Err(err) => Err(self.request_error(err.to_string())),
        }
    }
}
