use sqlx::PgPool;

use crate::models::PriceRecord;

/// Price history for one coin, newest first.
pub async fn fetch_by_symbol(
    pool: &PgPool,
    symbol: &str,
    limit: i64,
) -> Result<Vec<PriceRecord>, sqlx::Error> {
    sqlx::query_as::<_, PriceRecord>(
        r#"
        SELECT id, symbol, price, market_cap, volume_24h, observed_at, bucket_start
        FROM prices
        WHERE symbol = $1
        ORDER BY observed_at DESC
        LIMIT $2
        "#,
    )
    .bind(symbol)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn fetch_latest(pool: &PgPool, symbol: &str) -> Result<Option<PriceRecord>, sqlx::Error> {
    sqlx::query_as::<_, PriceRecord>(
        r#"
        SELECT id, symbol, price, market_cap, volume_24h, observed_at, bucket_start
        FROM prices
        WHERE symbol = $1
        ORDER BY observed_at DESC
        LIMIT 1
        "#,
    )
    .bind(symbol)
    .fetch_optional(pool)
    .await
}
