use sqlx::PgPool;

use crate::models::SocialTrendRecord;

/// Social trend items whose title mentions the given symbol, newest first.
pub async fn fetch_by_symbol(
    pool: &PgPool,
    symbol: &str,
    limit: i64,
) -> Result<Vec<SocialTrendRecord>, sqlx::Error> {
    sqlx::query_as::<_, SocialTrendRecord>(
        r#"
        SELECT id, external_id, symbol_or_title, platform, followers_or_comments,
               engagement_score, sentiment, trend_label, body_text, fetched_at
        FROM social_trends
        WHERE symbol_or_title ILIKE '%' || $1 || '%'
        ORDER BY fetched_at DESC
        LIMIT $2
        "#,
    )
    .bind(symbol)
    .bind(limit)
    .fetch_all(pool)
    .await
}
