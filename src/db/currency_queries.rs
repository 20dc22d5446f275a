use sqlx::PgPool;

use crate::models::FilteredCurrencyRecord;

pub async fn fetch_all(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<FilteredCurrencyRecord>, sqlx::Error> {
    sqlx::query_as::<_, FilteredCurrencyRecord>(
        r#"
        SELECT id, coin_id, symbol, name, current_price, market_cap,
               total_volume, price_change_24h_pct, fetched_at
        FROM filtered_currencies
        ORDER BY market_cap DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
