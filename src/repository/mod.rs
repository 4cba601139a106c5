//! Repository layer: transport contract, wire DTOs and per-resource
//! repositories.
//!
//! A repository executes one `(path, payload, verb)` request through the
//! [`Transport`] collaborator, deserializes the XML body into a transient
//! DTO and maps it onto a domain entity. DTOs never outlive the request
//! that produced them.

use std::fmt;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::error::{Error, Result};

pub mod iteration;
pub mod project;
pub mod story;
pub mod timestamp;

pub use iteration::IterationRepository;
pub use project::ProjectRepository;
pub use story::{MovePosition, StoryRepository};

/// HTTP verb of a repository request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Opaque API token attached to every outbound request.
///
/// Immutable for the lifetime of the client; there is no rotation or
/// refresh handling.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    // Keep the token value out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Tracker API.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.pivotaltracker.com/services/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Executes one request and returns the raw response body.
///
/// This is the single collaborator boundary of the crate: everything
/// network-shaped sits behind it, and tests substitute a scripted
/// implementation. A non-success response surfaces as [`Error::Api`]
/// carrying the server's message; an empty result set is a success with an
/// empty collection body, never an error.
pub trait Transport {
    fn request(&self, token: &Token, path: &str, body: Option<&str>, verb: Verb) -> Result<String>;
}

/// Server-side error body, `<errors><error>…</error></errors>`.
#[derive(Debug, Deserialize)]
struct ErrorsDto {
    #[serde(default)]
    error: Vec<String>,
}

/// Blocking HTTP transport over reqwest.
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Pull a human-readable message out of an error response body.
    fn error_message(body: &str, status: u16) -> String {
        if let Ok(errors) = quick_xml::de::from_str::<ErrorsDto>(body) {
            if !errors.error.is_empty() {
                return errors.error.join("; ");
            }
        }
        if body.trim().is_empty() {
            format!("Request failed ({status})")
        } else {
            body.trim().to_string()
        }
    }
}

impl Transport for HttpTransport {
    fn request(&self, token: &Token, path: &str, body: Option<&str>, verb: Verb) -> Result<String> {
        let url = self.url(path);

        let mut request = match verb {
            Verb::Get => self.client.get(&url),
            Verb::Post => self.client.post(&url),
            Verb::Put => self.client.put(&url),
            Verb::Delete => self.client.delete(&url),
        };
        request = request.header("X-TrackerToken", token.as_str());
        if let Some(payload) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/xml")
                .body(payload.to_string());
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text().unwrap_or_default();

        if status.is_success() {
            Ok(text)
        } else {
            let message = Self::error_message(&text, status.as_u16());
            warn!("{verb} {path} failed with {status}: {message}");
            Err(Error::api_full(message, status.as_u16(), path))
        }
    }
}

/// Root credential context shared by every node of the facade graph:
/// the opaque token plus the transport it rides on.
pub struct TrackerContext {
    token: Token,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for TrackerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerContext").finish_non_exhaustive()
    }
}

impl TrackerContext {
    pub fn new(token: Token, transport: Box<dyn Transport>) -> Self {
        Self { token, transport }
    }

    /// Context backed by the real HTTP transport.
    pub fn http(token: Token, config: ClientConfig) -> Result<Self> {
        Ok(Self::new(token, Box::new(HttpTransport::new(config)?)))
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Issue a bodyless request and deserialize the response.
    pub fn fetch<T: DeserializeOwned>(&self, path: &str, verb: Verb) -> Result<T> {
        debug!("{verb} {path}");
        let xml = self.transport.request(&self.token, path, None, verb)?;
        Ok(quick_xml::de::from_str(&xml)?)
    }

    /// Serialize `payload` under `root`, send it and deserialize the
    /// response.
    pub fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        root: &str,
        payload: &B,
        verb: Verb,
    ) -> Result<T> {
        let body = quick_xml::se::to_string_with_root(root, payload)?;
        debug!("{verb} {path}");
        let xml = self.transport.request(&self.token, path, Some(&body), verb)?;
        Ok(quick_xml::de::from_str(&xml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::Get.to_string(), "GET");
        assert_eq!(Verb::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("secret-value");
        assert_eq!(format!("{:?}", token), "Token(***)");
        assert_eq!(token.as_str(), "secret-value");
    }

    #[test]
    fn test_url_construction() {
        let transport = HttpTransport::new(ClientConfig {
            base_url: "https://www.pivotaltracker.com/services/v3/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            transport.url("/projects/1"),
            "https://www.pivotaltracker.com/services/v3/projects/1"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let body = "<errors><error>Story not found</error></errors>";
        assert_eq!(HttpTransport::error_message(body, 404), "Story not found");

        assert_eq!(
            HttpTransport::error_message("", 500),
            "Request failed (500)"
        );
        assert_eq!(HttpTransport::error_message("plain text", 400), "plain text");
    }
}
