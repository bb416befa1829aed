use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use std::{thread, time::Duration};

use crate::error::{Error, Result};

// Browser captures advertise compression we do not decode, and a stale
// content-length would not match the replayed body.
const SKIPPED_HEADERS: [&str; 2] = ["accept-encoding", "content-length"];

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The request never produced a status line.
///
/// `retryable` is false when the request could not even be built (a
/// malformed URL, say); only network-level failures are worth another try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub retryable: bool,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::invalid(e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// One blocking HTTP exchange. Any status, including errors, is a response.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Blocking delay used for backoff and politeness pauses.
pub trait Pause {
    fn pause(&self, duration: Duration);
}

pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut headers = HeaderMap::new();

        for (name, value) in &request.headers {
            if SKIPPED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                debug!("not replaying header {}", name);
                continue;
            }

            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => {
                    headers.insert(n, v);
                }
                _ => warn!("skipping invalid header {}", name),
            }
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers);

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder.send()?;
        let status = resp.status();
        let body = resp.bytes()?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

pub fn user_agent_header(user_agent: &str) -> (String, String) {
    (USER_AGENT.as_str().to_string(), user_agent.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbuildable_request_is_not_retryable() {
        let transport = ReqwestTransport::new(5).unwrap();

        let err = transport
            .send(&HttpRequest::get("not a url/abc123"))
            .unwrap_err();

        assert!(!err.retryable, "{err}");
    }

    #[test]
    fn test_error_constructors() {
        assert!(TransportError::network("reset").retryable);
        assert!(!TransportError::invalid("bad url").retryable);
        assert_eq!(TransportError::network("reset").to_string(), "reset");
    }
}
