use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Typed failure of one upstream call. Never escapes as a panic; the caller
/// decides whether to retry (in this pipeline: never within an invocation,
/// always at the next scheduled tick).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned status {status}")]
    Http { status: u16 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Thin wrapper over a shared reqwest client with a process-wide timeout.
/// Returns raw JSON; shaping the payload is the Normalizer's job.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Builds the shared client. The timeout is mandatory; a builder failure
    /// is surfaced to the caller rather than degrading to an untimed client.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET the endpoint and decode the body as opaque JSON.
    pub async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let resp = self.client.get(url).query(params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        resp.json::<Value>().await.map_err(FetchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_a_timeout() {
        assert!(UpstreamClient::new(Duration::from_secs(1)).is_ok());
    }
}
