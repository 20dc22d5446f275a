pub mod currency_queries;
pub mod investor_queries;
pub mod pg_store;
pub mod price_queries;
pub mod social_queries;
pub mod store;

#[cfg(test)]
pub mod mem;
