//! HTTP client for a running keymaster server.

use keymaster_cipher::Envelope;
use keymaster_gateway::ErrorMessage;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors returned by [`KeymasterClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server address could not be used as a base URL.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServer { url: String, reason: String },

    /// Transport failure.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request and said why.
    #[error("{status} {message}")]
    Server { status: u16, message: String },

    /// The server rejected the request without a message.
    #[error("Server returned HTTP status code: {status}")]
    Status { status: u16 },

    /// A success response with a body we could not read.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Talks to the `/api` resources of a keymaster server.
#[derive(Debug, Clone)]
pub struct KeymasterClient {
    base: Url,
    http: reqwest::Client,
}

impl KeymasterClient {
    /// Create a client for the server at `server`.
    pub fn new(server: &str) -> Result<Self> {
        let base = Url::parse(server).map_err(|e| ClientError::InvalidServer {
            url: server.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidServer {
                url: server.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `POST /api/credentials`
    pub async fn create(&self, spec: &Value) -> Result<Envelope> {
        self.send(Method::POST, &["api", "credentials"], Some(spec))
            .await
    }

    /// `GET /api/credentials/{app_id}`
    pub async fn get(&self, app_id: &str) -> Result<Envelope> {
        self.send(Method::GET, &["api", "credentials", app_id], None)
            .await
    }

    /// `PUT /api/credentials/{app_id}`
    pub async fn replace(&self, app_id: &str, spec: &Value) -> Result<Envelope> {
        self.send(Method::PUT, &["api", "credentials", app_id], Some(spec))
            .await
    }

    /// `PATCH /api/credentials/{app_id}/reissue`
    pub async fn reissue(&self, app_id: &str) -> Result<Envelope> {
        self.send(
            Method::PATCH,
            &["api", "credentials", app_id, "reissue"],
            None,
        )
        .await
    }

    /// `GET /api/apps`
    pub async fn list_apps(&self) -> Result<Vec<Vec<String>>> {
        self.send(Method::GET, &["api", "apps"], None).await
    }

    /// Join `segments` onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidServer {
                url: self.base.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &body));
    }

    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Interpret the body of a failed response.
pub fn error_from_body(status: u16, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorMessage>(body) {
        Ok(error) => ClientError::Server {
            status,
            message: error.message,
        },
        Err(_) => ClientError::Status { status },
    }
}
