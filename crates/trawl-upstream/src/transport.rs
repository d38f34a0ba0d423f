//! The HTTP seam. Production uses reqwest; tests swap in scripted transports.

use async_trait::async_trait;
use trawl_config::UpstreamConfig;

use crate::error::TransportError;

/// Status and body of one completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs a single GET. No retries and no deadline: the client owns both.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &reqwest::Url) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] over a shared `reqwest::Client`.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the client from the `[upstream]` section.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &reqwest::Url) -> Result<RawResponse, TransportError> {
        let response = self.http.get(url.clone()).send().await?;
        read_response(response).await
    }
}

/// Drain a response into a [`RawResponse`].
pub async fn read_response(response: reqwest::Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    Ok(RawResponse {
        status,
        body: body.to_vec(),
    })
}
