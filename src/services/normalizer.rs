use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    FilteredCurrencyRecord, InvestorRecord, Platform, PriceRecord, SocialTrendRecord,
};

/// Top-level payload shape was unrecognizable. Per-item defects never raise
/// this; they degrade to skip-and-count.
#[derive(Debug, Error)]
#[error("normalization error: {0}")]
pub struct NormalizationError(pub String);

/// Zero or more normalized records of one entity type, plus how many source
/// items were skipped as invalid.
#[derive(Debug)]
pub struct NormalizedBatch<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Maps a CoinGecko simple-price payload (coin-id -> {usd, usd_market_cap,
/// usd_24h_vol}) into price records. A coin without a numeric `usd` field is
/// dropped with a warning, not a fatal error.
pub fn normalize_prices(
    raw: &Value,
    observed_at: DateTime<Utc>,
    bucket: Duration,
) -> Result<NormalizedBatch<PriceRecord>, NormalizationError> {
    let map = raw
        .as_object()
        .ok_or_else(|| NormalizationError("price payload is not a JSON object".into()))?;

    let mut records = Vec::with_capacity(map.len());
    let mut skipped = 0;

    for (coin_id, fields) in map {
        let usd = fields.get("usd").and_then(Value::as_f64);
        let Some(price) = usd else {
            warn!(coin = %coin_id, "price entry missing usd field, skipping");
            skipped += 1;
            continue;
        };

        records.push(PriceRecord::new(
            coin_id.clone(),
            price,
            fields.get("usd_market_cap").and_then(Value::as_f64),
            fields.get("usd_24h_vol").and_then(Value::as_f64),
            observed_at,
            bucket,
        ));
    }

    Ok(NormalizedBatch { records, skipped })
}

/// Maps a Reddit listing (`data.children[].data`) into social trend records.
/// Items without the source-assigned `id` are skipped; HTML-escaped body text
/// is unescaped; engagement guards against a zero comment count.
pub fn normalize_social(
    raw: &Value,
    fetched_at: DateTime<Utc>,
) -> Result<NormalizedBatch<SocialTrendRecord>, NormalizationError> {
    let children = raw
        .pointer("/data/children")
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizationError("social payload has no data.children list".into()))?;

    let mut records = Vec::with_capacity(children.len());
    let mut skipped = 0;

    for item in children {
        let Some(data) = item.get("data").filter(|d| d.is_object()) else {
            skipped += 1;
            continue;
        };

        let external_id = data
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if external_id.is_empty() {
            debug!("social item missing id, skipping");
            skipped += 1;
            continue;
        }

        let title = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let ups = data.get("ups").and_then(Value::as_f64).unwrap_or(0.0);
        let comments = data
            .get("num_comments")
            .and_then(Value::as_i64)
            .unwrap_or(0)
            .max(0);
        // A post with zero comments still has defined engagement.
        let engagement = ups / comments.max(1) as f64;

        let body_text = data
            .get("selftext_html")
            .and_then(Value::as_str)
            .map(|s| html_escape::decode_html_entities(s).into_owned());

        let sentiment = data
            .get("positive_sentiment")
            .and_then(Value::as_f64)
            .unwrap_or(0.5);
        let trend_label = data
            .get("trend")
            .and_then(Value::as_str)
            .unwrap_or("Neutral")
            .to_string();

        match SocialTrendRecord::new(
            external_id,
            title,
            Platform::Reddit,
            comments,
            engagement,
            sentiment,
            trend_label,
            body_text,
            fetched_at,
        ) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("social item failed validation, skipping: {}", e);
                skipped += 1;
            }
        }
    }

    Ok(NormalizedBatch { records, skipped })
}

/// Maps an investor-listing payload (`{"investors": [...]}`) into investor
/// records. Entries without a name are skipped; a missing or non-numeric
/// investment amount becomes the unknown sentinel (None).
pub fn normalize_investors(
    raw: &Value,
    fetched_at: DateTime<Utc>,
) -> Result<NormalizedBatch<InvestorRecord>, NormalizationError> {
    let investors = raw
        .get("investors")
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizationError("investor payload has no investors list".into()))?;

    let mut records = Vec::with_capacity(investors.len());
    let mut skipped = 0;

    for entry in investors {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            debug!("investor entry missing name, skipping");
            skipped += 1;
            continue;
        }

        let cryptos = entry
            .get("cryptos_supported")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        records.push(InvestorRecord::new(
            name,
            cryptos,
            entry.get("amount_invested").and_then(Value::as_f64),
            fetched_at,
        ));
    }

    Ok(NormalizedBatch { records, skipped })
}

/// Maps a market-listing payload (array of coin objects) into filtered
/// currency candidates. Entries without the source coin id are skipped.
pub fn normalize_markets(
    raw: &Value,
    fetched_at: DateTime<Utc>,
) -> Result<NormalizedBatch<FilteredCurrencyRecord>, NormalizationError> {
    let coins = raw
        .as_array()
        .ok_or_else(|| NormalizationError("market payload is not a JSON array".into()))?;

    let mut records = Vec::with_capacity(coins.len());
    let mut skipped = 0;

    for coin in coins {
        let coin_id = coin
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if coin_id.is_empty() {
            debug!("market entry missing id, skipping");
            skipped += 1;
            continue;
        }

        records.push(FilteredCurrencyRecord::new(
            coin_id,
            coin.get("symbol").and_then(Value::as_str).unwrap_or_default().to_string(),
            coin.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
            coin.get("current_price").and_then(Value::as_f64).unwrap_or(0.0),
            coin.get("market_cap").and_then(Value::as_f64).unwrap_or(0.0),
            coin.get("total_volume").and_then(Value::as_f64).unwrap_or(0.0),
            coin.get("price_change_percentage_24h")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            fetched_at,
        ));
    }

    Ok(NormalizedBatch { records, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket() -> Duration {
        Duration::minutes(10)
    }

    #[test]
    fn prices_are_extracted_with_market_cap_and_volume() {
        let raw = json!({
            "bitcoin": {"usd": 48000.0, "usd_market_cap": 9e11, "usd_24h_vol": 2e10}
        });
        let batch = normalize_prices(&raw, Utc::now(), bucket()).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 0);
        let rec = &batch.records[0];
        assert_eq!(rec.symbol, "bitcoin");
        assert_eq!(rec.price, 48000.0);
        assert_eq!(rec.market_cap, Some(9e11));
        assert_eq!(rec.volume_24h, Some(2e10));
    }

    #[test]
    fn price_entry_without_usd_is_skipped_not_fatal() {
        let raw = json!({
            "bitcoin": {"usd": 48000.0},
            "broken": {"usd_market_cap": 1.0}
        });
        let batch = normalize_prices(&raw, Utc::now(), bucket()).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn non_object_price_payload_is_a_top_level_error() {
        assert!(normalize_prices(&json!([1, 2, 3]), Utc::now(), bucket()).is_err());
    }

    fn reddit_item(id: Option<&str>, ups: f64, comments: i64) -> Value {
        let mut data = json!({
            "title": "Bitcoin discussion",
            "ups": ups,
            "num_comments": comments,
        });
        if let Some(id) = id {
            data["id"] = json!(id);
        }
        json!({"data": data})
    }

    #[test]
    fn social_item_without_id_is_skipped_siblings_survive() {
        let raw = json!({"data": {"children": [
            reddit_item(Some("a1"), 10.0, 2),
            reddit_item(Some("a2"), 5.0, 0),
            reddit_item(None, 7.0, 3),
            reddit_item(Some("a4"), 1.0, 1),
            reddit_item(Some("a5"), 0.0, 0),
        ]}});
        let batch = normalize_social(&raw, Utc::now()).unwrap();
        assert_eq!(batch.records.len(), 4);
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn engagement_treats_zero_comments_as_one() {
        let raw = json!({"data": {"children": [reddit_item(Some("a1"), 12.0, 0)]}});
        let batch = normalize_social(&raw, Utc::now()).unwrap();
        assert_eq!(batch.records[0].engagement_score, 12.0);
    }

    #[test]
    fn social_body_html_is_unescaped() {
        let raw = json!({"data": {"children": [{
            "data": {"id": "x1", "title": "t", "ups": 1, "num_comments": 1,
                     "selftext_html": "&lt;p&gt;to the moon&lt;/p&gt;"}
        }]}});
        let batch = normalize_social(&raw, Utc::now()).unwrap();
        assert_eq!(batch.records[0].body_text.as_deref(), Some("<p>to the moon</p>"));
    }

    #[test]
    fn social_item_with_invalid_sentiment_is_skipped() {
        let raw = json!({"data": {"children": [{
            "data": {"id": "x1", "title": "t", "ups": 1, "num_comments": 1,
                     "positive_sentiment": 1.2}
        }]}});
        let batch = normalize_social(&raw, Utc::now()).unwrap();
        assert_eq!(batch.records.len(), 0);
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn social_defaults_applied() {
        let raw = json!({"data": {"children": [reddit_item(Some("a1"), 2.0, 4)]}});
        let batch = normalize_social(&raw, Utc::now()).unwrap();
        let rec = &batch.records[0];
        assert_eq!(rec.sentiment, 0.5);
        assert_eq!(rec.trend_label, "Neutral");
    }

    #[test]
    fn payload_without_children_is_a_top_level_error() {
        assert!(normalize_social(&json!({"data": {}}), Utc::now()).is_err());
    }

    #[test]
    fn investor_without_name_is_skipped() {
        let raw = json!({"investors": [
            {"name": "a16z", "cryptos_supported": ["bitcoin"], "amount_invested": 1e9},
            {"cryptos_supported": ["ethereum"]},
            {"name": "Pantera", "amount_invested": "unknown"},
        ]});
        let batch = normalize_investors(&raw, Utc::now()).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records[0].amount_invested, Some(1e9));
        // Non-numeric amount is the unknown sentinel.
        assert_eq!(batch.records[1].amount_invested, None);
    }

    #[test]
    fn market_entry_without_id_is_skipped() {
        let raw = json!([
            {"id": "dogecoin", "symbol": "doge", "name": "Dogecoin",
             "current_price": 0.2, "market_cap": 2e10, "total_volume": 1e9,
             "price_change_percentage_24h": -1.5},
            {"symbol": "???"},
        ]);
        let batch = normalize_markets(&raw, Utc::now()).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records[0].coin_id, "dogecoin");
        assert_eq!(batch.records[0].price_change_24h_pct, -1.5);
    }
}
