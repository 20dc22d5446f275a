use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::RedditCredentials;
use crate::external::client::{FetchError, UpstreamClient};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_BASE: &str = "https://oauth.reddit.com";
const ANON_BASE: &str = "https://api.reddit.com";

/// Safety margin subtracted from the advertised token lifetime so we refresh
/// slightly before Reddit actually expires it.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Reddit listing endpoints, optionally behind the OAuth client-credentials
/// flow. The bearer token is cached for its advertised lifetime and refreshed
/// transparently on expiry or on a 401 (one retry, never a loop).
pub struct RedditProvider {
    client: UpstreamClient,
    credentials: Option<RedditCredentials>,
    token: Mutex<Option<CachedToken>>,
    token_url: String,
    oauth_base: String,
    anon_base: String,
}

impl RedditProvider {
    pub fn new(client: UpstreamClient, credentials: Option<RedditCredentials>) -> Self {
        Self {
            client,
            credentials,
            token: Mutex::new(None),
            token_url: TOKEN_URL.to_string(),
            oauth_base: OAUTH_BASE.to_string(),
            anon_base: ANON_BASE.to_string(),
        }
    }

    /// All three endpoints pointed at one host, for tests that stand in for
    /// Reddit locally.
    #[cfg(test)]
    fn with_endpoints(
        client: UpstreamClient,
        credentials: Option<RedditCredentials>,
        base: &str,
    ) -> Self {
        Self {
            client,
            credentials,
            token: Mutex::new(None),
            token_url: format!("{}/api/v1/access_token", base),
            oauth_base: base.to_string(),
            anon_base: base.to_string(),
        }
    }

    /// Top listing for a subreddit, as opaque JSON.
    pub async fn top_listing(&self, subreddit: &str) -> Result<Value, FetchError> {
        let Some(creds) = &self.credentials else {
            // No credentials configured: anonymous listing endpoint.
            let url = format!("{}/r/{}/top", self.anon_base, subreddit);
            return self.client.get_json(&url, &[]).await;
        };

        let url = format!("{}/r/{}/top", self.oauth_base, subreddit);
        let token = self.ensure_token(creds).await?;

        match self.get_with_bearer(&url, &token, &creds.user_agent).await {
            Err(FetchError::Http { status: 401 }) => {
                // Token rejected before its advertised expiry. Refresh once.
                warn!("Reddit rejected cached token, refreshing");
                self.invalidate_token();
                let token = self.ensure_token(creds).await?;
                self.get_with_bearer(&url, &token, &creds.user_agent).await
            }
            other => other,
        }
    }

    async fn get_with_bearer(
        &self,
        url: &str,
        token: &str,
        user_agent: &str,
    ) -> Result<Value, FetchError> {
        let resp = self
            .client
            .inner()
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        resp.json::<Value>().await.map_err(FetchError::from)
    }

    async fn ensure_token(&self, creds: &RedditCredentials) -> Result<String, FetchError> {
        if let Some(cached) = self.token.lock().as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        debug!("acquiring Reddit access token");
        let resp = self
            .client
            .inner()
            .post(&self.token_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(reqwest::header::USER_AGENT, &creds.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp
            .json::<TokenResponse>()
            .await
            .map_err(FetchError::from)?;

        let lifetime = body.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS).max(1);
        let cached = CachedToken {
            value: body.access_token.clone(),
            expires_at: Instant::now() + std::time::Duration::from_secs(lifetime),
        };
        *self.token.lock() = Some(cached);

        Ok(body.access_token)
    }

    fn invalidate_token(&self) {
        *self.token.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    struct StubReddit {
        base: String,
        token_requests: Arc<AtomicUsize>,
        listing_requests: Arc<AtomicUsize>,
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = header_end(&buf) {
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Minimal local stand-in for Reddit: the token endpoint always issues a
    /// fresh token, the listing endpoint answers with the given statuses in
    /// order (repeating the last one).
    async fn spawn_stub(listing_statuses: Vec<u16>) -> StubReddit {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let token_requests = Arc::new(AtomicUsize::new(0));
        let listing_requests = Arc::new(AtomicUsize::new(0));
        let tok = token_requests.clone();
        let lst = listing_requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let request = read_request(&mut socket).await;

                let (status, reason, body) = if request.contains("/api/v1/access_token") {
                    let n = tok.fetch_add(1, Ordering::SeqCst) + 1;
                    (
                        200,
                        "OK",
                        format!(r#"{{"access_token":"tok-{}","expires_in":3600}}"#, n),
                    )
                } else {
                    let i = lst.fetch_add(1, Ordering::SeqCst);
                    let status = *listing_statuses
                        .get(i)
                        .or(listing_statuses.last())
                        .unwrap();
                    let reason = if status == 200 { "OK" } else { "Unauthorized" };
                    (status, reason, r#"{"data":{"children":[]}}"#.to_string())
                };

                let resp = format!(
                    "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(resp.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        StubReddit {
            base,
            token_requests,
            listing_requests,
        }
    }

    fn creds() -> RedditCredentials {
        RedditCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            user_agent: "test-agent".into(),
        }
    }

    fn provider(base: &str) -> RedditProvider {
        let client = UpstreamClient::new(Duration::from_secs(5)).unwrap();
        RedditProvider::with_endpoints(client, Some(creds()), base)
    }

    #[tokio::test]
    async fn a_rejected_token_is_refreshed_once_and_the_call_retried() {
        let stub = spawn_stub(vec![401, 200]).await;
        let provider = provider(&stub.base);

        let listing = provider.top_listing("cryptocurrency").await.unwrap();
        assert!(listing.pointer("/data/children").is_some());
        assert_eq!(stub.token_requests.load(Ordering::SeqCst), 2);
        assert_eq!(stub.listing_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_persistent_401_fails_after_exactly_one_retry() {
        let stub = spawn_stub(vec![401, 401]).await;
        let provider = provider(&stub.base);

        let err = provider.top_listing("cryptocurrency").await.unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 401 }));
        assert_eq!(stub.listing_requests.load(Ordering::SeqCst), 2);
        assert_eq!(stub.token_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_fresh_token_is_reused_across_calls() {
        let stub = spawn_stub(vec![200]).await;
        let provider = provider(&stub.base);

        provider.top_listing("cryptocurrency").await.unwrap();
        provider.top_listing("bitcoin").await.unwrap();
        assert_eq!(stub.token_requests.load(Ordering::SeqCst), 1);
        assert_eq!(stub.listing_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn an_expired_token_is_refreshed_before_the_call() {
        let stub = spawn_stub(vec![200]).await;
        let provider = provider(&stub.base);

        provider.top_listing("cryptocurrency").await.unwrap();
        // Age the cached token past its deadline.
        provider.token.lock().as_mut().unwrap().expires_at = Instant::now();

        provider.top_listing("cryptocurrency").await.unwrap();
        assert_eq!(stub.token_requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn anonymous_fallback_skips_the_token_exchange() {
        let stub = spawn_stub(vec![200]).await;
        let client = UpstreamClient::new(Duration::from_secs(5)).unwrap();
        let provider = RedditProvider::with_endpoints(client, None, &stub.base);

        provider.top_listing("cryptocurrency").await.unwrap();
        assert_eq!(stub.token_requests.load(Ordering::SeqCst), 0);
        assert_eq!(stub.listing_requests.load(Ordering::SeqCst), 1);
    }
}
