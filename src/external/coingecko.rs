use serde_json::Value;

use crate::external::client::{FetchError, UpstreamClient};

const SIMPLE_PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
const MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

/// CoinGecko price and market-listing endpoints.
pub struct CoinGeckoProvider {
    client: UpstreamClient,
}

impl CoinGeckoProvider {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Spot prices for a comma-separated coin-id list, with market cap and
    /// 24h volume included so the price pipeline can filter on them.
    pub async fn simple_price(
        &self,
        coin_ids: &[String],
        vs_currency: &str,
    ) -> Result<Value, FetchError> {
        let ids = coin_ids.join(",");
        self.client
            .get_json(
                SIMPLE_PRICE_URL,
                &[
                    ("ids", ids.as_str()),
                    ("vs_currencies", vs_currency),
                    ("include_market_cap", "true"),
                    ("include_24hr_vol", "true"),
                ],
            )
            .await
    }

    /// Market listing, paged and sorted by market cap descending.
    pub async fn markets(
        &self,
        vs_currency: &str,
        per_page: u32,
        page: u32,
    ) -> Result<Value, FetchError> {
        let per_page = per_page.to_string();
        let page = page.to_string();
        self.client
            .get_json(
                MARKETS_URL,
                &[
                    ("vs_currency", vs_currency),
                    ("order", "market_cap_desc"),
                    ("per_page", per_page.as_str()),
                    ("page", page.as_str()),
                    ("price_change_percentage", "24h"),
                ],
            )
            .await
    }
}
