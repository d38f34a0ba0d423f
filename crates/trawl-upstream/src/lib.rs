//! # trawl-upstream
//!
//! One bounded, retrying HTTP call against one catalog source.
//!
//! Every call ends in a [`UpstreamReply`] carrying an [`OutcomeStatus`];
//! failures are data, never `Err`. Each attempt runs under its own deadline,
//! transient failures (timeouts, connection errors, 5xx, 429) are retried
//! after a fixed backoff up to the attempt budget, and 4xx or unparseable
//! payloads end the call immediately.

mod error;
mod http;
mod payload;
mod policy;
mod transport;

pub use error::TransportError;
pub use http::build_url;
pub use payload::UpstreamPage;
pub use policy::RetryPolicy;
pub use transport::{RawResponse, ReqwestTransport, Transport, read_response};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use trawl_config::UpstreamConfig;
use trawl_core::{CatalogRequest, ErrorKind, OutcomeStatus};

use crate::http::Verdict;

/// Final result of one call, retries included.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: OutcomeStatus,
    /// Present for `Success` and `Empty`.
    pub page: Option<UpstreamPage>,
    pub error: Option<ErrorKind>,
    pub attempts: u32,
}

impl UpstreamReply {
    fn answered(status: OutcomeStatus, page: UpstreamPage, attempts: u32) -> Self {
        Self {
            status,
            page: Some(page),
            error: None,
            attempts,
        }
    }

    #[must_use]
    pub const fn failed(status: OutcomeStatus, error: ErrorKind, attempts: u32) -> Self {
        Self {
            status,
            page: None,
            error: Some(error),
            attempts,
        }
    }
}

/// HTTP client for catalog sources.
pub struct UpstreamClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl UpstreamClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Client backed by reqwest, configured from `[upstream]`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the client cannot be built.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Arc::new(ReqwestTransport::from_config(config)?),
            RetryPolicy::from_config(config),
        ))
    }

    /// Run a call to completion.
    pub async fn call(
        &self,
        endpoint: &str,
        request: &CatalogRequest,
        attempt_timeout: Duration,
    ) -> UpstreamReply {
        let never = CancellationToken::new();
        self.call_with_cancel(endpoint, request, attempt_timeout, &never)
            .await
            .unwrap_or_else(|| {
                UpstreamReply::failed(
                    OutcomeStatus::TransportError,
                    ErrorKind::Internal("call cancelled".to_string()),
                    0,
                )
            })
    }

    /// Run a call that stops as soon as `cancel` fires.
    ///
    /// Returns `None` when cancelled, either mid-attempt or during backoff.
    /// The worst case without cancellation is
    /// `max_attempts * attempt_timeout + (max_attempts - 1) * backoff`.
    pub async fn call_with_cancel(
        &self,
        endpoint: &str,
        request: &CatalogRequest,
        attempt_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Option<UpstreamReply> {
        let url = match build_url(endpoint, request) {
            Ok(url) => url,
            Err(error) => {
                return Some(UpstreamReply::failed(
                    OutcomeStatus::UpstreamError,
                    error,
                    0,
                ));
            }
        };

        let budget = self.policy.budget();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let attempt = tokio::time::timeout(attempt_timeout, self.transport.get(&url));
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return None,
                result = attempt => result,
            };

            let failure = match result {
                Err(_elapsed) => ErrorKind::Timeout,
                Ok(Err(e)) => e.kind(),
                Ok(Ok(response)) => match http::classify(&response) {
                    Verdict::Page(page) => {
                        return Some(UpstreamReply::answered(
                            OutcomeStatus::Success,
                            page,
                            attempts,
                        ));
                    }
                    Verdict::Empty(page) => {
                        return Some(UpstreamReply::answered(
                            OutcomeStatus::Empty,
                            page,
                            attempts,
                        ));
                    }
                    Verdict::Reject(error) => {
                        tracing::debug!(host = url.host_str(), %error, "upstream rejected request");
                        return Some(UpstreamReply::failed(
                            OutcomeStatus::UpstreamError,
                            error,
                            attempts,
                        ));
                    }
                    Verdict::Retry(error) => error,
                },
            };

            if attempts >= budget {
                let status = if failure == ErrorKind::Timeout {
                    OutcomeStatus::Timeout
                } else {
                    OutcomeStatus::TransportError
                };
                tracing::debug!(host = url.host_str(), attempts, %failure, "upstream attempts exhausted");
                return Some(UpstreamReply::failed(status, failure, attempts));
            }

            tracing::debug!(
                host = url.host_str(),
                attempt = attempts,
                %failure,
                "transient upstream failure, retrying"
            );
            tokio::select! {
                biased;
                () = cancel.cancelled() => return None,
                () = tokio::time::sleep(self.policy.backoff) => {}
            }
        }
    }
}
