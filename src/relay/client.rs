//! Client side of the relay: sends chat turns and decodes the reply.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::RelayError;
use crate::relay::protocol::{RelayErrorBody, RelayRequest, RelayResponse};

/// Something that can carry one chat turn to the agent and back.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn exchange(&self, request: &RelayRequest) -> Result<RelayResponse, RelayError>;
}

/// HTTP transport for a relay endpoint.
///
/// One request per turn; there is no local timeout and no retry.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    http_client: reqwest::Client,
    url: String,
}

impl HttpRelay {
    pub fn new(url: impl Into<String>) -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RelayTransport for HttpRelay {
    async fn exchange(&self, request: &RelayRequest) -> Result<RelayResponse, RelayError> {
        let response = self.http_client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<RelayErrorBody>(&body)
                .map(|parsed| parsed.error)
                .unwrap_or(body);
            return Err(RelayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|err| RelayError::Decode(err.to_string()))
    }
}
