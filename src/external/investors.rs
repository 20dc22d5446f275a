use serde_json::Value;

use crate::external::client::{FetchError, UpstreamClient};

/// Investor-listing endpoint. The upstream is a placeholder service (URL from
/// config); the payload shape is `{"investors": [...]}`.
pub struct InvestorApiProvider {
    client: UpstreamClient,
    base_url: String,
}

impl InvestorApiProvider {
    pub fn new(client: UpstreamClient, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn list_investors(&self, coin_ids: &[String]) -> Result<Value, FetchError> {
        let crypto = coin_ids.join(",");
        self.client
            .get_json(&self.base_url, &[("crypto", crypto.as_str())])
            .await
    }
}
