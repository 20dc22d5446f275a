use sqlx::PgPool;

use crate::models::InvestorRecord;

pub async fn fetch_all(pool: &PgPool, limit: i64) -> Result<Vec<InvestorRecord>, sqlx::Error> {
    sqlx::query_as::<_, InvestorRecord>(
        r#"
        SELECT id, name, cryptos_supported, amount_invested, fetched_at
        FROM investors
        ORDER BY name ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
