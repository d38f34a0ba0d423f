//! Response classification and URL construction.

use trawl_core::{CatalogRequest, ErrorKind};

use crate::payload::{self, UpstreamPage};
use crate::transport::RawResponse;

/// What one attempt's response means for the call.
#[derive(Debug)]
pub(crate) enum Verdict {
    /// At least one record.
    Page(UpstreamPage),
    /// Reachable, zero records.
    Empty(UpstreamPage),
    /// Transient: 5xx or 429. Worth another attempt.
    Retry(ErrorKind),
    /// Final: 4xx or an unparseable 2xx body.
    Reject(ErrorKind),
}

pub(crate) fn classify(response: &RawResponse) -> Verdict {
    let status = response.status;
    if status == 429 || (500..600).contains(&status) {
        return Verdict::Retry(ErrorKind::HttpStatus(status));
    }
    if !(200..300).contains(&status) {
        return Verdict::Reject(ErrorKind::HttpStatus(status));
    }
    match payload::decode(&response.body) {
        Ok(page) if page.is_empty() => Verdict::Empty(page),
        Ok(page) => Verdict::Page(page),
        Err(reason) => Verdict::Reject(ErrorKind::BadPayload(reason)),
    }
}

/// Append the request's query parameters to a source endpoint.
///
/// Endpoints often end in `/` or already carry a query string; both are kept.
pub fn build_url(endpoint: &str, request: &CatalogRequest) -> Result<reqwest::Url, ErrorKind> {
    let endpoint = endpoint.trim();
    let query = request
        .params()
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = match endpoint.rfind('?') {
        None => "?",
        Some(_) if endpoint.ends_with('?') || endpoint.ends_with('&') => "",
        Some(_) => "&",
    };

    let url = reqwest::Url::parse(&format!("{endpoint}{separator}{query}"))
        .map_err(|e| ErrorKind::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ErrorKind::InvalidEndpoint(format!(
            "{endpoint}: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}
