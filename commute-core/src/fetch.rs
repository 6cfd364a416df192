use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Cap on upstream error bodies quoted back in messages.
const MAX_SNIPPET_BYTES: usize = 4096;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid upstream URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned {status} for {url}: {snippet}")]
    UpstreamStatus {
        url: String,
        status: StatusCode,
        snippet: String,
    },

    #[error("failed to decode JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Thin wrapper around a pooled HTTP client with JSON helpers. The upstream
/// clients depend on it instead of owning their own connection pools.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { http })
    }

    /// GET `url` and decode the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let display = display_url(&url);

        let mut request = self.http.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: display.clone(), source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport { url: display.clone(), source })?;

        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                url: display,
                status,
                snippet: truncate_snippet(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url: display, source })
    }
}

/// Build a URL from a base and query parameters, skipping empty values.
pub fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    let filtered = params.iter().filter(|(_, value)| !value.is_empty());

    Url::parse_with_params(base, filtered)
        .map_err(|source| FetchError::InvalidUrl { url: base.to_string(), source })
}

/// Query params may carry credentials; errors keep only origin and path.
fn display_url(url: &Url) -> String {
    let mut scrubbed = url.clone();
    scrubbed.set_query(None);

    scrubbed.to_string()
}

fn truncate_snippet(body: &str) -> String {
    if body.len() <= MAX_SNIPPET_BYTES {
        return body.to_string();
    }

    let mut end = MAX_SNIPPET_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &body[..end])
}
