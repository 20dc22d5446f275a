use std::time::Duration;

use crate::services::filter::FilterBounds;

/// Credentials for the Reddit OAuth client-credentials exchange. When absent
/// the social job falls back to the unauthenticated listing endpoint.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Per-job polling intervals.
#[derive(Debug, Clone, Copy)]
pub struct JobIntervals {
    pub prices: Duration,
    pub social: Duration,
    pub investors: Duration,
    pub market_filter: Duration,
}

/// Process configuration, loaded once at startup and immutable afterwards.
///
/// Filter bounds are per-job: the market-filter job ships with the classic
/// penny-coin bounds, while the price job defaults to the identity filter so
/// large-cap coins are not silently dropped.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub coin_ids: Vec<String>,
    pub vs_currency: String,
    pub subreddits: Vec<String>,
    pub investor_api_url: String,
    pub reddit: Option<RedditCredentials>,
    pub intervals: JobIntervals,
    pub price_filter: FilterBounds,
    pub market_filter: FilterBounds,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let reddit = match (
            std::env::var("REDDIT_CLIENT_ID"),
            std::env::var("REDDIT_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret)) if !client_id.is_empty() => {
                Some(RedditCredentials {
                    client_id,
                    client_secret,
                    user_agent: std::env::var("REDDIT_USER_AGENT")
                        .unwrap_or_else(|_| "cryptoradar/0.1".to_string()),
                })
            }
            _ => None,
        };

        Self {
            port: env_parse("PORT", 4500),
            coin_ids: env_list("COIN_IDS", &["bitcoin", "ethereum", "cardano"]),
            vs_currency: std::env::var("VS_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
            subreddits: env_list("SUBREDDITS", &["cryptocurrency"]),
            investor_api_url: std::env::var("INVESTOR_API_URL")
                .unwrap_or_else(|_| "https://api.some-crypto-investor-api.com/investors".to_string()),
            reddit,
            intervals: JobIntervals {
                prices: Duration::from_secs(60 * env_parse("PRICE_INTERVAL_MINUTES", 10u64)),
                social: Duration::from_secs(60 * env_parse("SOCIAL_INTERVAL_MINUTES", 60u64)),
                investors: Duration::from_secs(60 * env_parse("INVESTOR_INTERVAL_MINUTES", 60u64)),
                market_filter: Duration::from_secs(60 * env_parse("FILTER_INTERVAL_MINUTES", 60u64)),
            },
            price_filter: FilterBounds {
                min_price: env_opt("PRICE_FILTER_MIN_PRICE"),
                max_price: env_opt("PRICE_FILTER_MAX_PRICE"),
                min_market_cap: env_opt("PRICE_FILTER_MIN_MARKET_CAP"),
                min_volume: env_opt("PRICE_FILTER_MIN_VOLUME"),
                allowed_symbols: None,
            },
            market_filter: FilterBounds {
                min_price: Some(env_parse("FILTER_MIN_PRICE", 0.1)),
                max_price: Some(env_parse("FILTER_MAX_PRICE", 10.0)),
                min_market_cap: Some(env_parse("FILTER_MIN_MARKET_CAP", 100_000_000.0)),
                min_volume: Some(env_parse("FILTER_MIN_VOLUME", 50_000.0)),
                allowed_symbols: None,
            },
            http_timeout: Duration::from_secs(env_parse("HTTP_TIMEOUT_SECONDS", 15u64)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}
