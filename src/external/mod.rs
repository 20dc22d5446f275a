pub mod client;
pub mod coingecko;
pub mod investors;
pub mod reddit;
